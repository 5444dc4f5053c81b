use std::io::{ErrorKind, Write};
use std::net::TcpStream;

use bytes::{BufMut, BytesMut};

use crate::codec::encode_frame;
use crate::config::{FrameConfig, ENVELOPE_HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::object::Object;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes enveloped frames to any `Write` stream.
///
/// This is the sending side of a connection. Replies travel the other way
/// through a [`crate::ConnResponder`].
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode `obj` for its version and send it (blocking).
    pub fn send(&mut self, obj: &Object) -> Result<()> {
        let frame = encode_frame(obj)?;
        self.write_frame(&frame)
    }

    /// Send an already encoded frame, version byte first.
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() > self.config.max_frame_size {
            return Err(FrameError::FrameTooLarge {
                size: frame.len(),
                max: self.config.max_frame_size,
            });
        }

        self.buf.clear();
        self.buf.reserve(ENVELOPE_HEADER_SIZE + frame.len());
        self.buf.put_u32(frame.len() as u32);
        self.buf.put_slice(frame);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<TcpStream> {
    /// Create a frame writer for `stream` and apply the write timeout.
    pub fn with_config_tcp(stream: TcpStream, config: FrameConfig) -> Result<Self> {
        stream.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(stream, config))
    }
}
