//! Version 1 wire layout.
//!
//! Request frame (all integers big-endian):
//! ```text
//! ┌────────┬──────────┬──────────┬────────────┐
//! │ u8 ver │ u8 obj   │ u8 cmd   │ u8 ack plcy│  fixed header
//! ├────────┴──────────┴──────────┴────────────┤
//! │ u8-len uid                                │  tracking sub-header
//! ├──────────┬──────────┬──────────┬──────────┤
//! │ u8-len a1│ u8-len a2│ u8-len a3│ u8-len a4│  arguments
//! ├──────────┴──────────┴──────────┴──────────┤
//! │ u8 payload encoding │ u16-len payload     │  body
//! └─────────────────────┴─────────────────────┘
//! ```
//!
//! Response frame:
//! ```text
//! ┌─────────────┬────────────┬────────┐
//! │ u16 body len│ u8-len uid │ u8 ack │
//! └─────────────┴────────────┴────────┘
//! ```

use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};

use crate::codec::WireCodec;
use crate::consts::{MAX_PAYLOAD_LEN, PROTOCOL_V1};
use crate::encoding::PayloadEncoding;
use crate::error::{DecodeError, DecodeErrorKind, EncodeError, Field};
use crate::object::{Object, Response};
use crate::primitive::{
    read_bytes_u16, read_length_u16, read_string_u8, read_u8, write_bytes_u16, write_string_u8,
    write_u16_be, write_u8,
};
use crate::responder::ConnResponder;

/// Fixed bytes in a V1 frame: version, three header tags, five string
/// prefixes, the encoding tag and the payload prefix.
const V1_FIXED_SIZE: usize = 4 + 5 + 1 + 2;

/// Codec for protocol version 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct V1Codec;

impl WireCodec for V1Codec {
    fn version(&self) -> u8 {
        PROTOCOL_V1
    }

    fn decode(
        &self,
        body: &[u8],
        responder: Option<Arc<ConnResponder>>,
    ) -> Result<Object, DecodeError> {
        decode_v1(body, responder)
    }

    fn encode(&self, obj: &Object) -> Result<Bytes, EncodeError> {
        encode_v1(obj)
    }

    fn encode_response(&self, response: &Response) -> Result<Bytes, EncodeError> {
        encode_response_v1(response)
    }

    fn decode_response(&self, frame: &[u8]) -> Result<Response, DecodeError> {
        decode_response_v1(frame)
    }
}

/// Decode a version-stripped V1 body.
///
/// Fields are consumed in wire order and the first failure aborts the decode.
/// The body must be consumed exactly.
pub fn decode_v1(
    body: &[u8],
    responder: Option<Arc<ConnResponder>>,
) -> Result<Object, DecodeError> {
    let mut src = body;

    let obj_type = read_u8(&mut src, Field::ObjType)?;
    let cmd_type = read_u8(&mut src, Field::CmdType)?;
    let ack_policy = read_u8(&mut src, Field::AckPolicy)?;

    let uid = read_string_u8(&mut src, Field::Uid)?;
    if uid.is_empty() {
        return Err(DecodeErrorKind::EmptyUid.into());
    }

    let arg1 = read_string_u8(&mut src, Field::Arg1)?;
    let arg2 = read_string_u8(&mut src, Field::Arg2)?;
    let arg3 = read_string_u8(&mut src, Field::Arg3)?;
    let arg4 = read_string_u8(&mut src, Field::Arg4)?;

    let payload_encoding = PayloadEncoding::from_tag(read_u8(&mut src, Field::PayloadEncoding)?);
    let payload = read_bytes_u16(&mut src, Field::Payload)?;

    if src.has_remaining() {
        return Err(DecodeErrorKind::TrailingData {
            remaining: src.remaining(),
        }
        .into());
    }

    Ok(Object {
        version: PROTOCOL_V1,
        obj_type,
        cmd_type,
        ack_policy,
        response: Response::new(uid.clone()),
        uid,
        arg1,
        arg2,
        arg3,
        arg4,
        payload_encoding,
        payload,
        responder,
    })
}

/// Encode `obj` as a complete V1 frame, version byte first.
pub fn encode_v1(obj: &Object) -> Result<Bytes, EncodeError> {
    if obj.uid.is_empty() {
        return Err(EncodeError::EmptyUid);
    }
    if obj.payload.len() > MAX_PAYLOAD_LEN {
        return Err(EncodeError::PayloadTooLarge {
            len: obj.payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }

    let strings_len = obj.uid.len() + obj.args().iter().map(|a| a.len()).sum::<usize>();
    let mut dst = BytesMut::with_capacity(V1_FIXED_SIZE + strings_len + obj.payload.len());

    write_u8(&mut dst, PROTOCOL_V1);
    write_u8(&mut dst, obj.obj_type);
    write_u8(&mut dst, obj.cmd_type);
    write_u8(&mut dst, obj.ack_policy);
    write_string_u8(&mut dst, Field::Uid, &obj.uid)?;
    for (field, arg) in Field::ARGS.into_iter().zip(obj.args()) {
        write_string_u8(&mut dst, field, arg)?;
    }
    write_u8(&mut dst, obj.payload_encoding.tag());
    write_bytes_u16(&mut dst, &obj.payload)?;

    Ok(dst.freeze())
}

/// Encode a response: `u16 body length ++ u8-len uid ++ u8 ack`.
pub fn encode_response_v1(response: &Response) -> Result<Bytes, EncodeError> {
    let mut body = BytesMut::with_capacity(1 + response.uid.len() + 1);
    write_string_u8(&mut body, Field::Uid, &response.uid)?;
    write_u8(&mut body, response.ack);

    let mut full = BytesMut::with_capacity(2 + body.len());
    // At most 1 + 255 + 1 bytes, always fits.
    write_u16_be(&mut full, body.len() as u16);
    full.extend_from_slice(&body);
    Ok(full.freeze())
}

/// Decode a complete response frame, length prefix included.
pub fn decode_response_v1(frame: &[u8]) -> Result<Response, DecodeError> {
    let mut src = frame;

    let declared = usize::from(read_length_u16(&mut src, Field::ResponseLength)?);
    if declared != src.remaining() {
        return Err(DecodeErrorKind::LengthMismatch {
            declared,
            actual: src.remaining(),
        }
        .into());
    }

    let uid = read_string_u8(&mut src, Field::Uid)?;
    let ack = read_u8(&mut src, Field::Ack)?;

    if src.has_remaining() {
        return Err(DecodeErrorKind::TrailingData {
            remaining: src.remaining(),
        }
        .into());
    }

    Ok(Response { uid, ack })
}
