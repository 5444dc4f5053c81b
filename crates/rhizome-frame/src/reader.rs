use std::io::{ErrorKind, Read};
use std::net::TcpStream;
use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, warn};

use crate::codec::{decode_frame, decode_response};
use crate::config::{FrameConfig, ENVELOPE_HEADER_SIZE};
use crate::consts::PROTOCOL_V1;
use crate::error::{FrameError, Result};
use crate::object::{Object, Response};
use crate::responder::ConnResponder;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Split one enveloped frame off the front of `src`.
///
/// Returns `Ok(None)` until a whole envelope is buffered. The declared size
/// is checked against `max_frame_size` before any of the body is awaited.
pub fn decode_envelope(src: &mut BytesMut, max_frame_size: usize) -> Result<Option<Bytes>> {
    if src.len() < ENVELOPE_HEADER_SIZE {
        return Ok(None);
    }

    let mut header = &src[..ENVELOPE_HEADER_SIZE];
    let frame_len = header.get_u32() as usize;
    if frame_len > max_frame_size {
        return Err(FrameError::FrameTooLarge {
            size: frame_len,
            max: max_frame_size,
        });
    }

    if src.len() < ENVELOPE_HEADER_SIZE + frame_len {
        return Ok(None);
    }

    src.advance(ENVELOPE_HEADER_SIZE);
    Ok(Some(src.split_to(frame_len).freeze()))
}

/// Reads enveloped frames from any `Read` stream and decodes them.
///
/// Handles partial reads internally. A frame whose body fails to decode is
/// reported as [`FrameError::Decode`] and the stream stays positioned on the
/// next envelope, so the caller can drop it and keep reading. An oversized
/// envelope leaves the stream unaligned and should end the connection.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    responder: Option<Arc<ConnResponder>>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            responder: None,
        }
    }

    /// Attach the responder for this connection to every decoded object.
    pub fn with_responder(mut self, responder: Arc<ConnResponder>) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Read the next raw frame (blocking), version byte first.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(frame) = decode_envelope(&mut self.buf, self.config.max_frame_size)? {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read and decode the next object (blocking).
    pub fn read_object(&mut self) -> Result<Object> {
        let frame = self.read_frame()?;
        match decode_frame(&frame, self.responder.clone()) {
            Ok(obj) => {
                debug!(uid = %obj.uid, version = obj.version, "decoded frame");
                Ok(obj)
            }
            Err(err) => {
                warn!(error = %err, len = frame.len(), "dropping malformed frame");
                Err(FrameError::Decode(err))
            }
        }
    }

    /// The responder attached to decoded objects, if any.
    pub fn responder(&self) -> Option<&Arc<ConnResponder>> {
        self.responder.as_ref()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<TcpStream> {
    /// Create a reader over `stream` that answers through a responder wrapping
    /// a clone of the same socket, and apply the read timeout from config.
    pub fn with_config_tcp(stream: TcpStream, config: FrameConfig) -> Result<Self> {
        stream.set_read_timeout(config.read_timeout)?;
        let write_half = stream.try_clone()?;
        write_half.set_write_timeout(config.write_timeout)?;
        let responder = Arc::new(ConnResponder::new(write_half));
        Ok(Self::with_config(stream, config).with_responder(responder))
    }
}

/// Reads response frames on the sending side of a connection.
pub struct ResponseReader<T> {
    inner: T,
    version: u8,
}

impl<T: Read> ResponseReader<T> {
    /// Read responses to version 1 objects.
    pub fn new(inner: T) -> Self {
        Self::for_version(inner, PROTOCOL_V1)
    }

    /// Read responses to objects of `version`.
    pub fn for_version(inner: T, version: u8) -> Self {
        Self { inner, version }
    }

    /// Read one response (blocking).
    pub fn read_response(&mut self) -> Result<Response> {
        let mut prefix = [0u8; 2];
        self.read_exact(&mut prefix)?;

        let body_len = usize::from(u16::from_be_bytes(prefix));
        let mut frame = vec![0u8; 2 + body_len];
        frame[..2].copy_from_slice(&prefix);
        self.read_exact(&mut frame[2..])?;

        Ok(decode_response(self.version, &frame)?)
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(|err| match err.kind() {
            ErrorKind::UnexpectedEof => FrameError::ConnectionClosed,
            _ => FrameError::Io(err),
        })
    }
}

impl ResponseReader<TcpStream> {
    /// Create a response reader for `stream` and apply the read timeout.
    pub fn with_config_tcp(stream: TcpStream, config: &FrameConfig) -> Result<Self> {
        stream.set_read_timeout(config.read_timeout)?;
        Ok(Self::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BufMut;

    use super::*;
    use crate::codec::encode_frame;
    use crate::error::DecodeErrorKind;
    use crate::v1::encode_response_v1;

    fn envelope(frame: &[u8]) -> Vec<u8> {
        let mut out = BytesMut::new();
        out.put_u32(frame.len() as u32);
        out.put_slice(frame);
        out.to_vec()
    }

    fn wire_for(uids: &[&str]) -> Vec<u8> {
        uids.iter()
            .flat_map(|uid| envelope(&encode_frame(&Object::new(*uid)).unwrap()))
            .collect()
    }

    #[test]
    fn read_single_object() {
        let mut reader = FrameReader::new(Cursor::new(wire_for(&["one"])));
        let obj = reader.read_object().unwrap();
        assert_eq!(obj.uid, "one");
        assert!(obj.responder.is_none());
    }

    #[test]
    fn read_multiple_objects() {
        let mut reader = FrameReader::new(Cursor::new(wire_for(&["one", "two", "three"])));
        let uids: Vec<String> = (0..3).map(|_| reader.read_object().unwrap().uid).collect();
        assert_eq!(uids, ["one", "two", "three"]);
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire_for(&["slow"]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);
        assert_eq!(reader.read_object().unwrap().uid, "slow");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_object().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut wire = wire_for(&["cut-short"]);
        wire.truncate(wire.len() - 3);
        let mut reader = FrameReader::new(Cursor::new(wire));
        let err = reader.read_object().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn oversized_envelope_rejected_before_body() {
        let mut wire = BytesMut::new();
        wire.put_u32(1024 * 1024);
        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(
            err,
            FrameError::FrameTooLarge {
                size: 1_048_576,
                ..
            }
        ));
    }

    #[test]
    fn malformed_frame_does_not_poison_stream() {
        let mut wire = envelope(&[9, 1, 2, 3]);
        wire.extend(wire_for(&["after"]));

        let mut reader = FrameReader::new(Cursor::new(wire));
        let err = reader.read_object().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Decode(ref e) if e.kind == DecodeErrorKind::UnsupportedVersion(9)
        ));
        assert_eq!(reader.read_object().unwrap().uid, "after");
    }

    #[test]
    fn trailing_bytes_inside_envelope_rejected() {
        let mut frame = encode_frame(&Object::new("x")).unwrap().to_vec();
        frame.push(0xEE);
        let mut reader = FrameReader::new(Cursor::new(envelope(&frame)));
        let err = reader.read_object().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Decode(ref e) if e.kind == DecodeErrorKind::TrailingData { remaining: 1 }
        ));
    }

    #[test]
    fn decode_envelope_waits_for_header_and_body() {
        let mut buf = BytesMut::from(&[0x00, 0x00][..]);
        assert!(decode_envelope(&mut buf, 16).unwrap().is_none());

        let mut buf = BytesMut::from(&[0x00, 0x00, 0x00, 0x03, 0xAA][..]);
        assert!(decode_envelope(&mut buf, 16).unwrap().is_none());

        buf.put_slice(&[0xBB, 0xCC]);
        let frame = decode_envelope(&mut buf, 16).unwrap().unwrap();
        assert_eq!(frame.as_ref(), &[0xAA, 0xBB, 0xCC]);
        assert!(buf.is_empty());
    }

    #[test]
    fn read_responses_back_to_back() {
        let mut wire = encode_response_v1(&Response {
            uid: "abc".to_string(),
            ack: 1,
        })
        .unwrap()
        .to_vec();
        wire.extend_from_slice(
            &encode_response_v1(&Response {
                uid: "z".to_string(),
                ack: 20,
            })
            .unwrap(),
        );

        let mut reader = ResponseReader::new(Cursor::new(wire));
        let first = reader.read_response().unwrap();
        let second = reader.read_response().unwrap();
        assert_eq!((first.uid.as_str(), first.ack), ("abc", 1));
        assert_eq!((second.uid.as_str(), second.ack), ("z", 20));

        let err = reader.read_response().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn truncated_response_is_connection_closed() {
        let mut reader = ResponseReader::new(Cursor::new(vec![0x00, 0x05, 0x03, b'a']));
        let err = reader.read_response().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }
}
