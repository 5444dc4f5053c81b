use std::io::Write;
use std::net::TcpStream;
use std::sync::Arc;

/// Rendering used when a stream cannot report its peer address.
pub const UNKNOWN_REMOTE: &str = "<unknown>";

/// A connected byte stream the protocol core can write replies to.
///
/// Both methods take `&self`: a transport is shared behind the responder that
/// serializes writes, so implementations must be usable from several threads.
/// `write` either delivers every byte of `buf` or returns the I/O error.
pub trait Transport: Send + Sync {
    /// Write all of `buf` to the stream.
    fn write(&self, buf: &[u8]) -> std::io::Result<()>;

    /// Peer address, for diagnostics and error messages.
    fn remote_address(&self) -> String;
}

impl Transport for TcpStream {
    fn write(&self, buf: &[u8]) -> std::io::Result<()> {
        let mut stream: &TcpStream = self;
        stream.write_all(buf)?;
        stream.flush()
    }

    fn remote_address(&self) -> String {
        self.peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| UNKNOWN_REMOTE.to_string())
    }
}

#[cfg(unix)]
impl Transport for std::os::unix::net::UnixStream {
    fn write(&self, buf: &[u8]) -> std::io::Result<()> {
        let mut stream: &std::os::unix::net::UnixStream = self;
        stream.write_all(buf)?;
        stream.flush()
    }

    fn remote_address(&self) -> String {
        match self.peer_addr() {
            Ok(addr) => match addr.as_pathname() {
                Some(path) => format!("unix:{}", path.display()),
                None => "unix:unnamed".to_string(),
            },
            Err(_) => UNKNOWN_REMOTE.to_string(),
        }
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn write(&self, buf: &[u8]) -> std::io::Result<()> {
        (**self).write(buf)
    }

    fn remote_address(&self) -> String {
        (**self).remote_address()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&self, buf: &[u8]) -> std::io::Result<()> {
        (**self).write(buf)
    }

    fn remote_address(&self) -> String {
        (**self).remote_address()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn tcp_stream_writes_all_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(addr).unwrap();
        let (mut server, _) = listener.accept().unwrap();

        Transport::write(&client, b"hello").unwrap();

        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn tcp_stream_reports_peer_address() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(addr).unwrap();
        let (_server, _) = listener.accept().unwrap();

        assert_eq!(client.remote_address(), addr.to_string());
    }

    #[test]
    #[cfg(unix)]
    fn unix_pair_reports_unnamed_peer() {
        let (left, mut right) = std::os::unix::net::UnixStream::pair().unwrap();
        assert_eq!(left.remote_address(), "unix:unnamed");

        Transport::write(&left, b"abc").unwrap();
        let mut buf = [0u8; 3];
        right.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn arc_transport_delegates() {
        let (left, _right) = loopback_pair();
        let shared: Arc<TcpStream> = Arc::new(left);
        let expected = shared.peer_addr().unwrap().to_string();
        assert_eq!(Transport::remote_address(&shared), expected);
    }

    fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }
}
