use std::time::Duration;

use crate::consts::MAX_V1_FRAME_SIZE;

/// Bytes in the stream envelope's length prefix (u32 big-endian).
pub const ENVELOPE_HEADER_SIZE: usize = 4;

/// Default largest accepted frame: the largest frame version 1 can produce.
pub const DEFAULT_MAX_FRAME: usize = MAX_V1_FRAME_SIZE;

/// Configuration for stream readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum frame size in bytes, envelope prefix excluded.
    pub max_frame_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
