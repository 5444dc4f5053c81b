//! Protocol constants.
//!
//! Object types, command types and ack codes beyond `ACK_UNKNOWN`/`ACK_SENT`
//! are application constructs. They are listed here so brokers and clients
//! agree on the values; the codec treats them as opaque bytes.

/// The only wire layout defined so far.
pub const PROTOCOL_V1: u8 = 1;

/// Ceiling for u8-prefixed strings.
pub const MAX_STRING_LEN: usize = u8::MAX as usize;

/// Ceiling for the u16-prefixed payload.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Largest possible V1 frame: version + three header bytes, five u8-prefixed
/// strings, the encoding tag and a u16-prefixed payload.
pub const MAX_V1_FRAME_SIZE: usize = 4 + 5 * (1 + MAX_STRING_LEN) + 1 + 2 + MAX_PAYLOAD_LEN;

// Object types.
pub const OBJ_UNKNOWN: u8 = 0;
pub const OBJ_DELIVERY: u8 = 1;
pub const OBJ_TRANSFORMER: u8 = 2;
pub const OBJ_SUBSCRIBER: u8 = 3;
pub const OBJ_CHANNEL: u8 = 4;
pub const OBJ_GLOBALS: u8 = 20;
pub const OBJ_ACTION: u8 = 50;

// Command types.
pub const CMD_UNKNOWN: u8 = 0;
pub const CMD_SEND: u8 = 1;
pub const CMD_ADD: u8 = 2;
pub const CMD_REMOVE: u8 = 3;
pub const CMD_UPDATE: u8 = 20;
pub const CMD_SIGTERM: u8 = 50;

/// Sender does not want a response.
pub const ACK_PLCY_NO_REPLY: u8 = 0;

/// Sender wants a response once the object has been delivered.
pub const ACK_PLCY_ON_SENT: u8 = 1;

/// Undetermined. Every response starts here.
pub const ACK_UNKNOWN: u8 = 0;
/// The broker finished sending the object to its subscribers.
pub const ACK_SENT: u8 = 1;
/// Generated client-side when no response arrived in time.
pub const ACK_TIMEOUT: u8 = 10;
pub const ACK_CHANNEL_NOT_FOUND: u8 = 20;
pub const ACK_CHANNEL_ALREADY_EXISTS: u8 = 21;
pub const ACK_ROUTE_NOT_FOUND: u8 = 30;

/// Returns a human-readable name for an ack code.
pub fn ack_name(ack: u8) -> &'static str {
    match ack {
        ACK_UNKNOWN => "UNKNOWN",
        ACK_SENT => "SENT",
        ACK_TIMEOUT => "TIMEOUT",
        ACK_CHANNEL_NOT_FOUND => "CHANNEL_NOT_FOUND",
        ACK_CHANNEL_ALREADY_EXISTS => "CHANNEL_ALREADY_EXISTS",
        ACK_ROUTE_NOT_FOUND => "ROUTE_NOT_FOUND",
        _ => "APPLICATION",
    }
}

/// Returns a human-readable name for an ack policy.
pub fn ack_policy_name(policy: u8) -> &'static str {
    match policy {
        ACK_PLCY_NO_REPLY => "NO_REPLY",
        ACK_PLCY_ON_SENT => "ON_SENT",
        _ => "APPLICATION",
    }
}
