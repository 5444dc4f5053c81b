//! Stream transport boundary for the rhizome wire protocol.
//!
//! The protocol core never owns sockets. It talks to whatever carries the
//! bytes through the [`Transport`] trait:
//! - [`std::net::TcpStream`] (the broker's native transport)
//! - [`std::os::unix::net::UnixStream`] (Unix only)
//!
//! [`TcpTransport`] adds the blocking bind/accept/connect plumbing used by
//! servers and the CLI.

pub mod error;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use tcp::TcpTransport;
pub use traits::{Transport, UNKNOWN_REMOTE};
