//! Wire protocol and connection plumbing for the rhizome message broker.
//!
//! # Crate Structure
//!
//! - [`transport`]: stream transport boundary (TCP, Unix sockets)
//! - [`frame`]: versioned frame codecs, version dispatch and the per-connection responder

/// Re-export transport types.
pub mod transport {
    pub use rhizome_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use rhizome_frame::*;
}
