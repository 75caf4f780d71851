//! Error types for SMTP delivery.

use std::io;
use std::time::Duration;

use crate::types::Reply;

/// Result type alias for SMTP delivery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A recipient the server refused during `RCPT TO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientRejection {
    /// The refused address.
    pub address: String,
    /// The server's reply to `RCPT TO`.
    pub reply: Reply,
}

impl std::fmt::Display for RecipientRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>: {}", self.address, self.reply)
    }
}

/// SMTP delivery error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The domain publishes no MX records.
    #[error("No mail server found for domain: {0}")]
    NoMailServer(String),

    /// The MX query itself failed.
    #[error("DNS lookup failed for {domain}: {reason}")]
    DnsLookupFailed {
        /// Queried domain, or `<system config>` when the resolver could not
        /// be set up.
        domain: String,
        /// Resolver error text.
        reason: String,
    },

    /// The chosen mail exchange has no usable network address.
    #[error("Could not resolve address of {host}: {reason}")]
    AddressResolutionFailed {
        /// Mail exchange hostname.
        host: String,
        /// Resolver error text.
        reason: String,
    },

    /// The TCP connection could not be established.
    #[error("Connection to {host} failed: {source}")]
    ConnectionError {
        /// Remote hostname.
        host: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error on an established connection.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The server sent something that is not a valid SMTP reply.
    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// The peer closed the connection.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// A read or write did not complete in time.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Greeting or EHLO was refused.
    #[error("Handshake rejected: {0}")]
    HandshakeRejected(Reply),

    /// TLS was required but the server does not offer STARTTLS.
    #[error("Server does not support STARTTLS")]
    TlsUnsupported,

    /// The server refused the STARTTLS command.
    #[error("STARTTLS rejected: {0}")]
    TlsNegotiationRejected(Reply),

    /// The TLS handshake failed (certificate or negotiation error).
    #[error("TLS handshake with {host} failed: {reason}")]
    TlsHandshakeFailed {
        /// Hostname verified against the certificate.
        host: String,
        /// TLS error text.
        reason: String,
    },

    /// `MAIL FROM` was refused.
    #[error("Sender rejected: {0}")]
    SenderRejected(Reply),

    /// A single `RCPT TO` was refused.
    #[error("Recipient rejected: {0}")]
    RecipientRejected(RecipientRejection),

    /// Every recipient of the transaction was refused.
    #[error("No recipients accepted ({} rejected)", .0.len())]
    NoRecipientsAccepted(Vec<RecipientRejection>),

    /// `DATA` or the message content was refused.
    #[error("Data rejected: {0}")]
    DataRejected(Reply),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

impl Error {
    /// Returns the server reply that caused this error, if any.
    #[must_use]
    pub const fn reply(&self) -> Option<&Reply> {
        match self {
            Self::HandshakeRejected(reply)
            | Self::TlsNegotiationRejected(reply)
            | Self::SenderRejected(reply)
            | Self::DataRejected(reply)
            | Self::RecipientRejected(RecipientRejection { reply, .. }) => Some(reply),
            _ => None,
        }
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.reply().is_some_and(Reply::is_permanent_error)
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.reply().is_some_and(Reply::is_transient_error)
    }
}
