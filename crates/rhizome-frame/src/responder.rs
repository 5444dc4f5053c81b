use std::sync::{Mutex, PoisonError};

use rhizome_transport::Transport;
use tracing::trace;

use crate::codec::encode_response;
use crate::error::{FrameError, Result};
use crate::object::Object;

/// The write side of one connection.
///
/// Every write goes through a lock held for the full duration of the
/// underlying transport call, so concurrent writers never interleave bytes.
/// Order between writers is whoever takes the lock first.
pub struct ConnResponder {
    transport: Box<dyn Transport>,
    write_lock: Mutex<()>,
}

impl ConnResponder {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            write_lock: Mutex::new(()),
        }
    }

    /// Remote address of the wrapped connection.
    pub fn remote_address(&self) -> String {
        self.transport.remote_address()
    }

    /// Write `bytes` contiguously. Transport errors are returned as-is.
    pub fn write(&self, bytes: &[u8]) -> std::io::Result<()> {
        // The lock guards no data, so a panic in another writer leaves
        // nothing to repair.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        trace!(len = bytes.len(), "responder write");
        self.transport.write(bytes)
    }

    /// Set `obj`'s ack, encode its response and write it in one call.
    pub fn respond_with_ack(&self, obj: &mut Object, ack: u8) -> Result<()> {
        if obj.responder.is_none() {
            return Err(FrameError::NoResponder);
        }
        obj.response.ack = ack;
        let encoded = encode_response(obj)?;
        self.write(&encoded)?;
        Ok(())
    }
}

impl std::fmt::Debug for ConnResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnResponder")
            .field("remote", &self.remote_address())
            .finish()
    }
}
