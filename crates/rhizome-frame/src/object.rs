use std::sync::Arc;

use bytes::Bytes;

use crate::consts::{ack_name, ack_policy_name, ACK_PLCY_NO_REPLY, ACK_UNKNOWN, PROTOCOL_V1};
use crate::encoding::PayloadEncoding;
use crate::error::{FrameError, Result};
use crate::responder::ConnResponder;

/// The reply to an object: its UID and a one-byte result code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub uid: String,
    pub ack: u8,
}

impl Response {
    /// A response for `uid` with ack `ACK_UNKNOWN`.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ack: ACK_UNKNOWN,
        }
    }
}

/// A decoded unit of work.
///
/// Objects come from [`crate::decode_frame`], which attaches the responder
/// for the connection the bytes arrived on, or from [`Object::new`] for
/// outbound sends, which leaves the responder empty.
///
/// Equality compares wire fields only; the responder and the attached
/// response are not part of it.
#[derive(Debug, Clone)]
pub struct Object {
    pub version: u8,
    pub obj_type: u8,
    pub cmd_type: u8,
    pub ack_policy: u8,
    pub uid: String,
    pub arg1: String,
    pub arg2: String,
    pub arg3: String,
    pub arg4: String,
    pub payload_encoding: PayloadEncoding,
    pub payload: Bytes,
    pub responder: Option<Arc<ConnResponder>>,
    pub response: Response,
}

impl Object {
    /// Create a version 1 object with the given UID and empty fields.
    pub fn new(uid: impl Into<String>) -> Self {
        let uid = uid.into();
        Self {
            version: PROTOCOL_V1,
            obj_type: 0,
            cmd_type: 0,
            ack_policy: ACK_PLCY_NO_REPLY,
            response: Response::new(uid.clone()),
            uid,
            arg1: String::new(),
            arg2: String::new(),
            arg3: String::new(),
            arg4: String::new(),
            payload_encoding: PayloadEncoding::Na,
            payload: Bytes::new(),
            responder: None,
        }
    }

    /// Override the protocol version used to encode this object.
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Set application routing tags.
    pub fn with_types(mut self, obj_type: u8, cmd_type: u8) -> Self {
        self.obj_type = obj_type;
        self.cmd_type = cmd_type;
        self
    }

    pub fn with_ack_policy(mut self, ack_policy: u8) -> Self {
        self.ack_policy = ack_policy;
        self
    }

    /// Set the four positional arguments.
    pub fn with_args(
        mut self,
        arg1: impl Into<String>,
        arg2: impl Into<String>,
        arg3: impl Into<String>,
        arg4: impl Into<String>,
    ) -> Self {
        self.arg1 = arg1.into();
        self.arg2 = arg2.into();
        self.arg3 = arg3.into();
        self.arg4 = arg4.into();
        self
    }

    pub fn with_payload(mut self, encoding: PayloadEncoding, payload: impl Into<Bytes>) -> Self {
        self.payload_encoding = encoding;
        self.payload = payload.into();
        self
    }

    /// Attach the responder replies should go through.
    pub fn with_responder(mut self, responder: Arc<ConnResponder>) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Arguments in wire order.
    pub fn args(&self) -> [&str; 4] {
        [&self.arg1, &self.arg2, &self.arg3, &self.arg4]
    }

    /// Whether the sender asked for any response at all.
    pub fn wants_reply(&self) -> bool {
        self.ack_policy != ACK_PLCY_NO_REPLY
    }

    /// Remote address of the originating connection, if any.
    pub fn remote_address(&self) -> Option<String> {
        self.responder.as_ref().map(|r| r.remote_address())
    }

    /// Set the ack and send the response back over the originating connection.
    pub fn respond_with_ack(&mut self, ack: u8) -> Result<()> {
        let responder = self.responder.clone().ok_or(FrameError::NoResponder)?;
        responder.respond_with_ack(self, ack)
    }

    /// Multi-line rendering of every field, for diagnostics.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("version: {}", self.version),
            format!("obj_type: {}", self.obj_type),
            format!("cmd_type: {}", self.cmd_type),
            format!(
                "ack_policy: {} ({})",
                self.ack_policy,
                ack_policy_name(self.ack_policy)
            ),
        ];
        if let Some(remote) = self.remote_address() {
            lines.push(format!("return_address: {remote}"));
        }
        lines.push(format!("uid: {}", self.uid));
        lines.extend(
            self.args()
                .iter()
                .enumerate()
                .map(|(i, arg)| format!("arg{}: {arg}", i + 1)),
        );
        lines.push(format!("payload_encoding: {}", self.payload_encoding));
        lines.push(format!(
            "payload: {}",
            String::from_utf8_lossy(&self.payload)
        ));
        lines.push(format!(
            "response: ack={} ({})",
            self.response.ack,
            ack_name(self.response.ack)
        ));
        lines.join("\n")
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.obj_type == other.obj_type
            && self.cmd_type == other.cmd_type
            && self.ack_policy == other.ack_policy
            && self.uid == other.uid
            && self.args() == other.args()
            && self.payload_encoding == other.payload_encoding
            && self.payload == other.payload
    }
}

impl Eq for Object {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ACK_PLCY_ON_SENT, CMD_SEND, OBJ_DELIVERY};

    #[test]
    fn new_attaches_matching_response() {
        let obj = Object::new("uid-123");
        assert_eq!(obj.version, PROTOCOL_V1);
        assert_eq!(obj.response, Response::new("uid-123"));
        assert_eq!(obj.response.ack, ACK_UNKNOWN);
        assert!(obj.responder.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let obj = Object::new("u")
            .with_types(OBJ_DELIVERY, CMD_SEND)
            .with_ack_policy(ACK_PLCY_ON_SENT)
            .with_args("a", "b", "c", "d")
            .with_payload(PayloadEncoding::Json, &b"{}"[..]);

        assert_eq!(obj.obj_type, OBJ_DELIVERY);
        assert_eq!(obj.cmd_type, CMD_SEND);
        assert!(obj.wants_reply());
        assert_eq!(obj.args(), ["a", "b", "c", "d"]);
        assert_eq!(obj.payload_encoding, PayloadEncoding::Json);
        assert_eq!(obj.payload.as_ref(), b"{}");
    }

    #[test]
    fn respond_without_responder_fails() {
        let mut obj = Object::new("uid-1");
        let err = obj.respond_with_ack(1).unwrap_err();
        assert!(matches!(err, FrameError::NoResponder));
    }

    #[test]
    fn equality_ignores_response_state() {
        let a = Object::new("u").with_args("x", "", "", "");
        let mut b = a.clone();
        b.response.ack = 21;
        assert_eq!(a, b);

        let c = a.clone().with_args("y", "", "", "");
        assert_ne!(a, c);
    }

    #[test]
    fn summary_lists_fields() {
        let obj = Object::new("uid-9")
            .with_args("one", "", "", "")
            .with_payload(PayloadEncoding::from_tag(99), &b"hi"[..]);
        let summary = obj.summary();
        assert!(summary.contains("uid: uid-9"));
        assert!(summary.contains("arg1: one"));
        assert!(summary.contains("payload_encoding: unknown(99)"));
        assert!(summary.contains("payload: hi"));
        assert!(!summary.contains("return_address"));
    }

    #[test]
    fn summary_line_order() {
        let obj = Object::new("u")
            .with_ack_policy(ACK_PLCY_ON_SENT)
            .with_args("a", "b", "c", "d");
        let lines: Vec<String> = obj.summary().lines().map(str::to_owned).collect();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "version: 1");
        assert_eq!(lines[3], "ack_policy: 1 (ON_SENT)");
        assert_eq!(lines[4], "uid: u");
        assert_eq!(lines[8], "arg4: d");
        assert_eq!(lines[11], "response: ack=0 (UNKNOWN)");
        assert!(!obj.summary().ends_with('\n'));
    }
}
