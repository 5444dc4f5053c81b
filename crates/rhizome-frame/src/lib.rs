//! Versioned, length-prefixed wire format for rhizome brokers.
//!
//! Every frame starts with a one-byte protocol version. The version selects
//! the codec for the rest of the frame; version 1 carries:
//! - three one-byte routing tags (object type, command type, ack policy)
//! - a u8-prefixed UID and four u8-prefixed string arguments
//! - a payload encoding tag and a u16-prefixed payload
//!
//! Decoding never over-reads: each declared length is checked against the
//! bytes that remain, and a frame must be consumed exactly. Replies go back
//! through a [`ConnResponder`], which serializes writes on one connection.
//!
//! String fields are strict UTF-8. Peers that send arbitrary bytes in the UID
//! or an argument have the whole frame rejected with
//! [`DecodeErrorKind::InvalidUtf8`]; binary data belongs in the payload.

pub mod codec;
pub mod config;
pub mod consts;
pub mod encoding;
pub mod error;
pub mod object;
pub mod primitive;
pub mod reader;
pub mod responder;
pub mod v1;
pub mod writer;

pub use codec::{
    decode_frame, decode_response, default_registry, encode_frame, encode_response,
    CodecRegistry, WireCodec, UNATTACHED_REMOTE,
};
pub use config::{FrameConfig, DEFAULT_MAX_FRAME, ENVELOPE_HEADER_SIZE};
pub use consts::{
    ack_name, ack_policy_name, ACK_CHANNEL_ALREADY_EXISTS, ACK_CHANNEL_NOT_FOUND,
    ACK_PLCY_NO_REPLY, ACK_PLCY_ON_SENT, ACK_ROUTE_NOT_FOUND, ACK_SENT, ACK_TIMEOUT, ACK_UNKNOWN,
    MAX_PAYLOAD_LEN, MAX_STRING_LEN, MAX_V1_FRAME_SIZE, PROTOCOL_V1,
};
pub use encoding::PayloadEncoding;
pub use error::{DecodeError, DecodeErrorKind, EncodeError, Field, FrameError, Result};
pub use object::{Object, Response};
pub use reader::{FrameReader, ResponseReader};
pub use responder::ConnResponder;
pub use v1::V1Codec;
pub use writer::FrameWriter;
