//! Raw byte streams and the connector that opens them.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

/// Any bidirectional byte stream a session can run over.
pub trait IoStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> IoStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// A type-erased stream, plaintext or already wrapped in TLS.
pub type BoxedStream = Box<dyn IoStream>;

/// Opens the raw connection to a mail exchange.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connects to `addr`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the connection cannot be made.
    async fn connect(&self, addr: SocketAddr) -> io::Result<BoxedStream>;
}

/// Plain TCP connector with a bounded connect time.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    timeout: Duration,
}

impl TcpConnector {
    /// Creates a connector that gives up after `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, addr: SocketAddr) -> io::Result<BoxedStream> {
        debug!(%addr, "connecting");
        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect timed out after {:?}", self.timeout),
                )
            })??;
        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }
}
