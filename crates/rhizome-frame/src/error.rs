use std::fmt;

/// Wire fields, named in error messages.
///
/// The string fields (`Uid`, `Arg1`..`Arg4`) must hold UTF-8. A frame carrying
/// any other bytes there is rejected whole with
/// [`DecodeErrorKind::InvalidUtf8`], so senders that put raw binary in string
/// fields cannot talk to this decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Version,
    ObjType,
    CmdType,
    AckPolicy,
    Uid,
    Arg1,
    Arg2,
    Arg3,
    Arg4,
    PayloadEncoding,
    Payload,
    ResponseLength,
    Ack,
}

impl Field {
    /// The four argument fields in wire order.
    pub const ARGS: [Field; 4] = [Field::Arg1, Field::Arg2, Field::Arg3, Field::Arg4];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Version => "version",
            Field::ObjType => "obj_type",
            Field::CmdType => "cmd_type",
            Field::AckPolicy => "ack_policy",
            Field::Uid => "uid",
            Field::Arg1 => "arg1",
            Field::Arg2 => "arg2",
            Field::Arg3 => "arg3",
            Field::Arg4 => "arg4",
            Field::PayloadEncoding => "payload_encoding",
            Field::Payload => "payload",
            Field::ResponseLength => "response_length",
            Field::Ack => "ack",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong while decoding inbound bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeErrorKind {
    /// Input ended before a fixed-width field could be read.
    #[error("unexpected end of input reading {field}")]
    UnexpectedEnd { field: Field },

    /// A length prefix declared more bytes than remain in the input.
    #[error("{field} declares {declared} bytes but only {remaining} remain")]
    TruncatedField {
        field: Field,
        declared: usize,
        remaining: usize,
    },

    /// A length prefix exceeds the field's ceiling.
    #[error("{field} declares {declared} bytes, limit is {max}")]
    LengthExceedsLimit {
        field: Field,
        declared: usize,
        max: usize,
    },

    /// The required UID field is empty.
    #[error("empty uid")]
    EmptyUid,

    /// A string field is not valid UTF-8. The entire frame is rejected.
    #[error("{field} is not valid utf-8")]
    InvalidUtf8 { field: Field },

    /// Bytes remain after the last field of the frame.
    #[error("{remaining} bytes of trailing data after frame")]
    TrailingData { remaining: usize },

    /// The leading version byte names no known codec.
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    /// A response's declared body length disagrees with the bytes present.
    #[error("response declares {declared} body bytes, got {actual}")]
    LengthMismatch { declared: usize, actual: usize },
}

/// A decode failure, with the sender's address when a responder is known.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}{}", remote_suffix(.remote))]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub remote: Option<String>,
}

impl DecodeError {
    /// Attach the remote address of the connection the bytes came from.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    /// The field the failure was detected in, if it concerns a single field.
    pub fn field(&self) -> Option<Field> {
        match &self.kind {
            DecodeErrorKind::UnexpectedEnd { field }
            | DecodeErrorKind::TruncatedField { field, .. }
            | DecodeErrorKind::LengthExceedsLimit { field, .. }
            | DecodeErrorKind::InvalidUtf8 { field } => Some(*field),
            DecodeErrorKind::EmptyUid => Some(Field::Uid),
            DecodeErrorKind::UnsupportedVersion(_) => Some(Field::Version),
            DecodeErrorKind::TrailingData { .. } | DecodeErrorKind::LengthMismatch { .. } => None,
        }
    }
}

impl From<DecodeErrorKind> for DecodeError {
    fn from(kind: DecodeErrorKind) -> Self {
        Self { kind, remote: None }
    }
}

fn remote_suffix(remote: &Option<String>) -> String {
    match remote {
        Some(addr) => format!(" (from {addr})"),
        None => String::new(),
    }
}

/// Encode-time validation failures. No partial output accompanies these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The object has no UID.
    #[error("uid must not be empty")]
    EmptyUid,

    /// A u8-prefixed string field is longer than 255 bytes.
    #[error("{field} too long for u8 prefix ({len} bytes, max {max})")]
    StringTooLong { field: Field, len: usize, max: usize },

    /// The payload is longer than its u16 prefix allows.
    #[error("payload too large ({len} bytes, max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    /// No codec is registered for the object's version.
    #[error("unable to encode for {remote}: unsupported protocol version {version}")]
    UnsupportedVersion { version: u8, remote: String },
}

/// Errors that can occur while moving frames over a connection.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Inbound bytes were malformed.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An outbound object failed validation.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The object was constructed locally and has nowhere to reply to.
    #[error("object has no responder attached")]
    NoResponder,

    /// A stream envelope declares more bytes than the configured maximum.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
