//! Send/receive over a plaintext or TLS channel.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::trace;

use super::stream::BoxedStream;
use super::tls::TlsProvider;
use crate::error::{Error, Result};

/// Security mode of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityMode {
    /// Plaintext TCP.
    Plain,
    /// TLS session over the original socket.
    Tls,
}

impl std::fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::Tls => f.write_str("tls"),
        }
    }
}

enum Channel {
    Plain(BoxedStream),
    Tls(BoxedStream),
    Closed,
}

/// Byte transport for one SMTP session.
///
/// Every call is bounded by the I/O timeout. Once the peer closes, a TLS
/// upgrade fails, or [`Transport::shutdown`] runs, the transport is closed
/// and further calls fail with [`Error::ConnectionClosed`].
pub struct Transport {
    channel: Channel,
    io_timeout: Duration,
}

impl Transport {
    /// Wraps a freshly connected plaintext stream.
    #[must_use]
    pub fn plain(stream: BoxedStream, io_timeout: Duration) -> Self {
        Self {
            channel: Channel::Plain(stream),
            io_timeout,
        }
    }

    /// Returns the current security mode, or `None` once closed.
    #[must_use]
    pub const fn security(&self) -> Option<SecurityMode> {
        match self.channel {
            Channel::Plain(_) => Some(SecurityMode::Plain),
            Channel::Tls(_) => Some(SecurityMode::Tls),
            Channel::Closed => None,
        }
    }

    /// Returns true while the channel can still carry commands.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.channel, Channel::Closed)
    }

    /// Sends every byte of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the write fails, [`Error::Timeout`] if it
    /// stalls, or [`Error::ConnectionClosed`] if the transport is closed.
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        let io_timeout = self.io_timeout;
        let stream = self.stream()?;
        let result = bounded(io_timeout, async {
            stream.write_all(data).await?;
            stream.flush().await
        })
        .await;

        match result {
            Ok(()) => {
                trace!(bytes = data.len(), "sent");
                Ok(())
            }
            Err(e @ Error::Timeout(_)) => Err(e),
            Err(e) => {
                self.channel = Channel::Closed;
                Err(e)
            }
        }
    }

    /// Receives up to `buf.len()` bytes, returning how many were read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the peer closed the connection,
    /// [`Error::Timeout`] if nothing arrived in time, or [`Error::Io`].
    pub async fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let io_timeout = self.io_timeout;
        let stream = self.stream()?;
        let result = bounded(io_timeout, stream.read(buf)).await;

        match result {
            Ok(0) => {
                self.channel = Channel::Closed;
                Err(Error::ConnectionClosed)
            }
            Ok(n) => {
                trace!(bytes = n, "received");
                Ok(n)
            }
            Err(e @ Error::Timeout(_)) => Err(e),
            Err(e) => {
                self.channel = Channel::Closed;
                Err(e)
            }
        }
    }

    /// Upgrades a plaintext channel to TLS over the same socket.
    ///
    /// On failure the transport is left closed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the handshake does not finish within the
    /// I/O timeout, and [`Error::TlsHandshakeFailed`] if the provider rejects
    /// it or the channel is not plaintext.
    pub async fn upgrade(&mut self, tls: &dyn TlsProvider, hostname: &str) -> Result<()> {
        let stream = match std::mem::replace(&mut self.channel, Channel::Closed) {
            Channel::Plain(stream) => stream,
            other => {
                self.channel = other;
                return Err(Error::TlsHandshakeFailed {
                    host: hostname.to_string(),
                    reason: "channel is not plaintext".into(),
                });
            }
        };

        let secured = tokio::time::timeout(self.io_timeout, tls.handshake(stream, hostname))
            .await
            .map_err(|_| Error::Timeout(self.io_timeout))??;

        self.channel = Channel::Tls(secured);
        Ok(())
    }

    /// Shuts the channel down and releases the socket.
    pub async fn shutdown(&mut self) {
        let io_timeout = self.io_timeout;
        if let Ok(stream) = self.stream() {
            let _ = bounded(io_timeout, stream.shutdown()).await;
        }
        self.channel = Channel::Closed;
    }

    fn stream(&mut self) -> Result<&mut BoxedStream> {
        match &mut self.channel {
            Channel::Plain(stream) | Channel::Tls(stream) => Ok(stream),
            Channel::Closed => Err(Error::ConnectionClosed),
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("security", &self.security())
            .field("io_timeout", &self.io_timeout)
            .finish()
    }
}

async fn bounded<T>(limit: Duration, fut: impl Future<Output = io::Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(Error::Timeout(limit)),
    }
}
