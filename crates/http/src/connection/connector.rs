//! Transport establishment.
//!
//! A [`Connector`] opens the duplex byte stream a client session runs on. The
//! session applies the connect timeout around it, so implementations only deal
//! with resolving and dialing.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, lookup_host};
use tracing::{debug, trace};

use crate::protocol::ConnectError;

#[trait_variant::make(Connector: Send)]
pub trait LocalConnector {
    type Stream: AsyncRead + AsyncWrite + Unpin;

    /// Opens a stream to `host:port`.
    async fn connect(&self, host: &str, port: u16) -> Result<Self::Stream, ConnectError>;
}

/// Plain TCP connector, tries every resolved address in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Stream, ConnectError> {
        let addrs = lookup_host((host, port))
            .await
            .map_err(|source| ConnectError::Resolve { host: host.to_owned(), port, source })?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    trace!(%addr, "tcp stream established");
                    return Ok(stream);
                }
                Err(e) => {
                    debug!(%addr, cause = %e, "connect attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => e.into(),
            None => ConnectError::NoAddress { host: host.to_owned(), port },
        })
    }
}

/// Parses a textual port, rejecting anything that is not in `1..=65535`.
pub(crate) fn parse_port(port: &str) -> Result<u16, ConnectError> {
    match port.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ConnectError::invalid_port(port)),
        Ok(port) => Ok(port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn port_text() {
        assert_eq!(parse_port("80").unwrap(), 80);
        assert_eq!(parse_port(" 8080 ").unwrap(), 8080);
        assert!(matches!(parse_port("0"), Err(ConnectError::InvalidPort { .. })));
        assert!(matches!(parse_port("http"), Err(ConnectError::InvalidPort { .. })));
        assert!(matches!(parse_port("65536"), Err(ConnectError::InvalidPort { .. })));
    }

    #[tokio::test]
    async fn connect_to_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream = Connector::connect(&TcpConnector, "127.0.0.1", port).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap().port(), port);
    }

    #[tokio::test]
    async fn connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = Connector::connect(&TcpConnector, "127.0.0.1", port).await;
        assert!(matches!(result, Err(ConnectError::Io { .. })));
    }
}
