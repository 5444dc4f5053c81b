//! Version dispatch.
//!
//! The first byte of every frame is the protocol version. It is interpreted
//! here and nowhere else: the registry maps each version to a [`WireCodec`]
//! and hands it the rest of the frame. Adding a layout means registering a
//! new codec; existing ones are untouched.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;

use crate::error::{DecodeError, DecodeErrorKind, EncodeError, Field};
use crate::object::{Object, Response};
use crate::primitive::read_u8;
use crate::responder::ConnResponder;
use crate::v1::V1Codec;

/// Remote address used in errors for objects with no responder.
pub const UNATTACHED_REMOTE: &str = "<unattached>";

/// One wire layout.
pub trait WireCodec: Send + Sync {
    /// The version byte this codec handles.
    fn version(&self) -> u8;

    /// Decode a frame body (version byte already consumed).
    fn decode(
        &self,
        body: &[u8],
        responder: Option<Arc<ConnResponder>>,
    ) -> Result<Object, DecodeError>;

    /// Encode a complete frame, version byte included.
    fn encode(&self, obj: &Object) -> Result<Bytes, EncodeError>;

    /// Encode the acknowledgment frame for a response.
    fn encode_response(&self, response: &Response) -> Result<Bytes, EncodeError>;

    /// Decode an acknowledgment frame produced by `encode_response`.
    fn decode_response(&self, frame: &[u8]) -> Result<Response, DecodeError>;
}

/// Lookup from version byte to codec.
pub struct CodecRegistry {
    codecs: BTreeMap<u8, Box<dyn WireCodec>>,
}

impl CodecRegistry {
    /// A registry with no codecs; every version is unsupported.
    pub fn empty() -> Self {
        Self {
            codecs: BTreeMap::new(),
        }
    }

    /// Register `codec` under its version, returning any codec it replaces.
    pub fn register(&mut self, codec: impl WireCodec + 'static) -> Option<Box<dyn WireCodec>> {
        self.codecs.insert(codec.version(), Box::new(codec))
    }

    pub fn get(&self, version: u8) -> Option<&dyn WireCodec> {
        self.codecs.get(&version).map(|codec| &**codec)
    }

    /// Registered versions, ascending.
    pub fn versions(&self) -> Vec<u8> {
        self.codecs.keys().copied().collect()
    }

    /// Read the version byte and decode the remainder with the matching codec.
    ///
    /// Unknown versions fail without consuming anything past the first byte.
    /// Errors carry the responder's remote address when one is given.
    pub fn decode_frame(
        &self,
        bytes: &[u8],
        responder: Option<Arc<ConnResponder>>,
    ) -> Result<Object, DecodeError> {
        let mut src = bytes;
        let version =
            read_u8(&mut src, Field::Version).map_err(|e| attach_remote(e, responder.as_ref()))?;

        let Some(codec) = self.get(version) else {
            let err = DecodeErrorKind::UnsupportedVersion(version).into();
            return Err(attach_remote(err, responder.as_ref()));
        };

        codec
            .decode(src, responder.clone())
            .map_err(|e| attach_remote(e, responder.as_ref()))
    }

    /// Encode `obj` with the codec for `obj.version`.
    pub fn encode_frame(&self, obj: &Object) -> Result<Bytes, EncodeError> {
        self.codec_for(obj)?.encode(obj)
    }

    /// Encode `obj.response` with the codec for `obj.version`.
    pub fn encode_response(&self, obj: &Object) -> Result<Bytes, EncodeError> {
        self.codec_for(obj)?.encode_response(&obj.response)
    }

    /// Decode a response frame sent for an object of `version`.
    pub fn decode_response(&self, version: u8, frame: &[u8]) -> Result<Response, DecodeError> {
        match self.get(version) {
            Some(codec) => codec.decode_response(frame),
            None => Err(DecodeErrorKind::UnsupportedVersion(version).into()),
        }
    }

    fn codec_for(&self, obj: &Object) -> Result<&dyn WireCodec, EncodeError> {
        self.get(obj.version)
            .ok_or_else(|| EncodeError::UnsupportedVersion {
                version: obj.version,
                remote: obj
                    .remote_address()
                    .unwrap_or_else(|| UNATTACHED_REMOTE.to_string()),
            })
    }
}

impl Default for CodecRegistry {
    /// A registry knowing every built-in layout.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(V1Codec);
        registry
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("versions", &self.versions())
            .finish()
    }
}

fn attach_remote(err: DecodeError, responder: Option<&Arc<ConnResponder>>) -> DecodeError {
    match responder {
        Some(responder) => err.with_remote(responder.remote_address()),
        None => err,
    }
}

/// The process-wide registry of built-in codecs.
pub fn default_registry() -> &'static CodecRegistry {
    static REGISTRY: OnceLock<CodecRegistry> = OnceLock::new();
    REGISTRY.get_or_init(CodecRegistry::default)
}

/// Decode one complete frame, attaching `responder` to the resulting object.
pub fn decode_frame(
    bytes: &[u8],
    responder: Option<Arc<ConnResponder>>,
) -> Result<Object, DecodeError> {
    default_registry().decode_frame(bytes, responder)
}

/// Encode `obj` as a complete frame for its version.
pub fn encode_frame(obj: &Object) -> Result<Bytes, EncodeError> {
    default_registry().encode_frame(obj)
}

/// Encode the response attached to `obj` for its version.
pub fn encode_response(obj: &Object) -> Result<Bytes, EncodeError> {
    default_registry().encode_response(obj)
}

/// Decode a response frame sent for an object of `version`.
pub fn decode_response(version: u8, frame: &[u8]) -> Result<Response, DecodeError> {
    default_registry().decode_response(version, frame)
}
