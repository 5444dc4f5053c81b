//! Fixed-width integers and length-prefixed fields.
//!
//! All multi-byte integers are big-endian. Every length-prefixed read checks
//! the declared length against the bytes actually remaining before copying,
//! so a hostile prefix can neither over-read nor force a large allocation.

use bytes::{Buf, BufMut, Bytes};

use crate::consts::{MAX_PAYLOAD_LEN, MAX_STRING_LEN};
use crate::error::{DecodeError, DecodeErrorKind, EncodeError, Field};

pub fn write_u8<B: BufMut>(dst: &mut B, n: u8) {
    dst.put_u8(n);
}

pub fn write_u16_be<B: BufMut>(dst: &mut B, n: u16) {
    dst.put_u16(n);
}

/// Write a one-byte length followed by the UTF-8 bytes of `s`.
pub fn write_string_u8<B: BufMut>(dst: &mut B, field: Field, s: &str) -> Result<(), EncodeError> {
    let len = s.len();
    if len > MAX_STRING_LEN {
        return Err(EncodeError::StringTooLong {
            field,
            len,
            max: MAX_STRING_LEN,
        });
    }
    dst.put_u8(len as u8);
    dst.put_slice(s.as_bytes());
    Ok(())
}

/// Write a two-byte length followed by `data`.
pub fn write_bytes_u16<B: BufMut>(dst: &mut B, data: &[u8]) -> Result<(), EncodeError> {
    let len = data.len();
    if len > MAX_PAYLOAD_LEN {
        return Err(EncodeError::PayloadTooLarge {
            len,
            max: MAX_PAYLOAD_LEN,
        });
    }
    dst.put_u16(len as u16);
    dst.put_slice(data);
    Ok(())
}

pub fn read_u8<B: Buf>(src: &mut B, field: Field) -> Result<u8, DecodeError> {
    if !src.has_remaining() {
        return Err(DecodeErrorKind::UnexpectedEnd { field }.into());
    }
    Ok(src.get_u8())
}

/// Read a one-byte length prefix.
///
/// The width already bounds the value by `MAX_STRING_LEN`; there is no
/// separate ceiling to check.
pub fn read_length_u8<B: Buf>(src: &mut B, field: Field) -> Result<u8, DecodeError> {
    read_u8(src, field)
}

/// Read a two-byte big-endian length prefix, rejecting values above
/// `MAX_PAYLOAD_LEN`.
pub fn read_length_u16<B: Buf>(src: &mut B, field: Field) -> Result<u16, DecodeError> {
    if src.remaining() < 2 {
        return Err(DecodeErrorKind::UnexpectedEnd { field }.into());
    }
    let n = src.get_u16();
    if usize::from(n) > MAX_PAYLOAD_LEN {
        return Err(DecodeErrorKind::LengthExceedsLimit {
            field,
            declared: usize::from(n),
            max: MAX_PAYLOAD_LEN,
        }
        .into());
    }
    Ok(n)
}

/// Read a u8-prefixed UTF-8 string. A zero length yields an empty string.
///
/// Bytes that are not UTF-8 fail with `InvalidUtf8` rather than being
/// carried through.
pub fn read_string_u8<B: Buf>(src: &mut B, field: Field) -> Result<String, DecodeError> {
    let len = usize::from(read_length_u8(src, field)?);
    if len == 0 {
        return Ok(String::new());
    }
    let raw = take_exact(src, field, len)?;
    String::from_utf8(raw.to_vec()).map_err(|_| DecodeErrorKind::InvalidUtf8 { field }.into())
}

/// Read u16-prefixed bytes. A zero length yields an empty buffer.
pub fn read_bytes_u16<B: Buf>(src: &mut B, field: Field) -> Result<Bytes, DecodeError> {
    let len = usize::from(read_length_u16(src, field)?);
    if len == 0 {
        return Ok(Bytes::new());
    }
    take_exact(src, field, len)
}

fn take_exact<B: Buf>(src: &mut B, field: Field, declared: usize) -> Result<Bytes, DecodeError> {
    let remaining = src.remaining();
    if remaining < declared {
        return Err(DecodeErrorKind::TruncatedField {
            field,
            declared,
            remaining,
        }
        .into());
    }
    Ok(src.copy_to_bytes(declared))
}
