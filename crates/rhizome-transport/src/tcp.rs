use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// TCP listener transport.
///
/// Provides blocking bind/accept/connect for broker-style servers. Accepted
/// and connected streams are plain [`TcpStream`]s, which implement
/// [`crate::Transport`].
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `addr` (e.g. `127.0.0.1:7000`, port `0` for any).
    pub fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let local_addr = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

        info!(%local_addr, "listening on tcp");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<TcpStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        stream.set_nodelay(true)?;
        debug!(%peer, "accepted connection");
        Ok(stream)
    }

    /// Connect to a listening peer (blocking).
    pub fn connect(addr: &str) -> Result<TcpStream> {
        let stream = TcpStream::connect(addr).map_err(|e| TransportError::Connect {
            addr: addr.to_string(),
            source: e,
        })?;
        stream.set_nodelay(true)?;
        debug!(addr, "connected over tcp");
        Ok(stream)
    }

    /// Connect with an upper bound on the connection attempt.
    pub fn connect_timeout(addr: &str, timeout: Duration) -> Result<TcpStream> {
        let resolved: SocketAddr = addr.parse().map_err(|_| TransportError::Connect {
            addr: addr.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "address must be a literal ip:port",
            ),
        })?;
        let stream = TcpStream::connect_timeout(&resolved, timeout).map_err(|e| {
            TransportError::Connect {
                addr: addr.to_string(),
                source: e,
            }
        })?;
        stream.set_nodelay(true)?;
        debug!(addr, "connected over tcp");
        Ok(stream)
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;
    use crate::traits::Transport;

    #[test]
    fn test_bind_accept_connect() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let handle = std::thread::spawn(move || {
            let mut client = TcpTransport::connect(&addr).unwrap();
            client.write_all(b"hello").unwrap();
        });

        let mut server = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");

        handle.join().unwrap();
    }

    #[test]
    fn test_bind_invalid_address() {
        let result = TcpTransport::bind("not-an-address");
        assert!(matches!(result, Err(TransportError::Bind { .. })));
    }

    #[test]
    fn test_connect_refused() {
        // Bind then drop to get a port with nothing listening.
        let addr = {
            let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
            listener.local_addr().to_string()
        };
        let result = TcpTransport::connect(&addr);
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[test]
    fn test_connect_timeout_rejects_hostnames() {
        let result = TcpTransport::connect_timeout("localhost:1", Duration::from_millis(10));
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[test]
    fn test_accepted_stream_remote_matches_client() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let client = TcpTransport::connect(&listener.local_addr().to_string()).unwrap();
        let server = listener.accept().unwrap();

        assert_eq!(
            server.remote_address(),
            client.local_addr().unwrap().to_string()
        );
        assert_eq!(listener.transport_name(), "tcp");
    }
}
