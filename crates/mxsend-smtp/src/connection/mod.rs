//! SMTP connection management.

mod reader;
mod stream;
mod tls;
mod transport;

pub use reader::read_reply;
pub use stream::{BoxedStream, Connector, IoStream, TcpConnector};
pub use tls::{RustlsProvider, TlsProvider, create_context};
pub use transport::{SecurityMode, Transport};

use std::collections::HashSet;

use tracing::debug;

use crate::command::Command;
use crate::error::Result;
use crate::types::{Extension, Reply};

/// Server capabilities from the greeting and EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Supported extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Records the hostname announced in the greeting.
    #[must_use]
    pub fn from_greeting(greeting: &Reply) -> Self {
        let hostname = greeting
            .lines()
            .first()
            .and_then(|line| line.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Self {
            hostname,
            extensions: HashSet::new(),
        }
    }

    /// Replaces the extension set with the one advertised in an EHLO reply.
    ///
    /// The first line of the reply is the greeting and is skipped.
    pub fn set_extensions(&mut self, ehlo: &Reply) {
        self.extensions = ehlo
            .lines()
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
    }

    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }
}

/// An open connection to one mail exchange.
#[derive(Debug)]
pub struct Connection {
    transport: Transport,
    hostname: String,
}

impl Connection {
    /// Wraps a transport connected to `hostname`.
    #[must_use]
    pub fn new(transport: Transport, hostname: impl Into<String>) -> Self {
        Self {
            transport,
            hostname: hostname.into(),
        }
    }

    /// Returns the remote hostname.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Returns the transport mutably.
    pub const fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    /// Reads the next reply.
    ///
    /// # Errors
    ///
    /// See [`read_reply`].
    pub async fn read_reply(&mut self) -> Result<Reply> {
        read_reply(&mut self.transport).await
    }

    /// Sends a command and reads its reply.
    ///
    /// # Errors
    ///
    /// Returns any transport or reply parsing error.
    pub async fn send_command(&mut self, cmd: &Command) -> Result<Reply> {
        debug!(host = %self.hostname, command = cmd.verb(), "sending");
        self.transport.send(&cmd.serialize()).await?;
        let reply = self.read_reply().await?;
        debug!(host = %self.hostname, command = cmd.verb(), reply = %reply, "reply");
        Ok(reply)
    }

    /// Upgrades the connection with TLS, verifying the remote hostname.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TlsHandshakeFailed`] if the handshake fails.
    pub async fn starttls(&mut self, tls: &dyn TlsProvider) -> Result<()> {
        self.transport.upgrade(tls, &self.hostname).await
    }
}
