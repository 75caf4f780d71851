//! The SMTP client session state machine.
//!
//! ```text
//! Init ─► Connected ─► Greeted ─► EhloDone ─┬──────────────────────────────┐
//!                                           └► TlsNegotiating ─► SecureEhloDone
//!                                                                          │
//!   ┌──────────────────────────────────────────────────────────────────────┘
//!   ▼
//! SenderSet ─► RecipientsSet ─► DataInProgress ─► Completed
//!
//! any failure ─► Aborted
//! ```
//!
//! QUIT is sent on the way to either terminal state whenever the channel is
//! still open; its outcome is ignored.

mod report;

pub use report::{DeliveryReport, GroupDelivery, GroupReport};

use tracing::{debug, info, warn};

use crate::body::{DATA_TERMINATOR, dot_stuff};
use crate::command::Command;
use crate::config::{Config, TlsPolicy};
use crate::connection::{Connection, SecurityMode, ServerInfo, TlsProvider};
use crate::error::{Error, RecipientRejection, Result};
use crate::recipients::RecipientGroup;
use crate::types::{Address, Reply, ReplyCode};

/// State of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Nothing connected yet.
    Init,
    /// Socket open, greeting not yet read.
    Connected,
    /// 220 greeting received.
    Greeted,
    /// Plaintext EHLO accepted.
    EhloDone,
    /// STARTTLS issued, handshake pending.
    TlsNegotiating,
    /// EHLO accepted again over TLS.
    SecureEhloDone,
    /// MAIL FROM accepted.
    SenderSet,
    /// At least one RCPT TO accepted.
    RecipientsSet,
    /// DATA accepted, message being sent.
    DataInProgress,
    /// Message accepted for delivery.
    Completed,
    /// Delivery abandoned.
    Aborted,
}

impl TransactionState {
    /// Returns true for `Completed` and `Aborted`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

/// Sender and content of a message.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Reverse path for `MAIL FROM`.
    pub sender: Address,
    /// RFC 5322 message; line endings are normalized on the wire.
    pub body: Vec<u8>,
}

impl Envelope {
    /// Creates an envelope.
    #[must_use]
    pub fn new(sender: Address, body: impl Into<Vec<u8>>) -> Self {
        Self {
            sender,
            body: body.into(),
        }
    }
}

/// One SMTP session delivering one message to one recipient group.
pub struct Transaction<'a> {
    conn: Connection,
    state: TransactionState,
    config: &'a Config,
    tls: &'a dyn TlsProvider,
    server_info: ServerInfo,
}

impl<'a> Transaction<'a> {
    /// Takes ownership of a freshly opened connection.
    #[must_use]
    pub fn new(conn: Connection, config: &'a Config, tls: &'a dyn TlsProvider) -> Self {
        let mut transaction = Self {
            conn,
            state: TransactionState::Init,
            config,
            tls,
            server_info: ServerInfo::default(),
        };
        transaction.advance(TransactionState::Connected);
        transaction
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> TransactionState {
        self.state
    }

    /// Runs the session to a terminal state and closes the connection.
    ///
    /// Refused recipients are recorded in the report; the transaction fails
    /// only if none is accepted.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: a refused greeting/EHLO, STARTTLS
    /// problems, a refused sender, no accepted recipients, refused data, or
    /// any transport or reply parsing error.
    pub async fn run(
        &mut self,
        envelope: &Envelope,
        group: &RecipientGroup,
    ) -> Result<GroupReport> {
        let result = self.execute(envelope, group).await;

        match &result {
            Ok(report) => {
                self.advance(TransactionState::Completed);
                info!(
                    domain = %group.domain,
                    server = %self.conn.hostname(),
                    accepted = report.accepted.len(),
                    rejected = report.rejected.len(),
                    security = %report.security,
                    "message accepted"
                );
            }
            Err(err) => {
                self.advance(TransactionState::Aborted);
                warn!(
                    domain = %group.domain,
                    server = %self.conn.hostname(),
                    error = %err,
                    "delivery aborted"
                );
            }
        }

        // A peer that let a read expire will not answer QUIT either.
        let timed_out = matches!(result, Err(Error::Timeout(_)));
        self.quit(!timed_out).await;
        result
    }

    async fn execute(
        &mut self,
        envelope: &Envelope,
        group: &RecipientGroup,
    ) -> Result<GroupReport> {
        let greeting = self.conn.read_reply().await?;
        if !greeting.is(ReplyCode::SERVICE_READY) {
            return Err(Error::HandshakeRejected(greeting));
        }
        self.server_info = ServerInfo::from_greeting(&greeting);
        self.advance(TransactionState::Greeted);

        self.ehlo().await?;
        self.advance(TransactionState::EhloDone);

        self.negotiate_tls().await?;

        let reply = self
            .conn
            .send_command(&Command::MailFrom {
                from: envelope.sender.clone(),
            })
            .await?;
        if !reply.is(ReplyCode::OK) {
            return Err(Error::SenderRejected(reply));
        }
        self.advance(TransactionState::SenderSet);

        let (accepted, rejected) = self.add_recipients(group).await?;
        self.advance(TransactionState::RecipientsSet);

        let reply = self.send_data(&envelope.body).await?;

        Ok(GroupReport {
            domain: group.domain.clone(),
            server: self.conn.hostname().to_string(),
            security: self
                .conn
                .transport()
                .security()
                .unwrap_or(SecurityMode::Plain),
            server_info: self.server_info.clone(),
            accepted,
            rejected,
            reply,
        })
    }

    async fn ehlo(&mut self) -> Result<()> {
        let reply = self
            .conn
            .send_command(&Command::Ehlo {
                hostname: self.config.helo_name.clone(),
            })
            .await?;
        if !reply.is(ReplyCode::OK) {
            return Err(Error::HandshakeRejected(reply));
        }
        self.server_info.set_extensions(&reply);
        Ok(())
    }

    async fn negotiate_tls(&mut self) -> Result<()> {
        match self.config.tls {
            TlsPolicy::Disabled => return Ok(()),
            TlsPolicy::Opportunistic if !self.server_info.supports_starttls() => {
                warn!(
                    server = %self.conn.hostname(),
                    "STARTTLS not offered, continuing in plaintext"
                );
                return Ok(());
            }
            TlsPolicy::Required if !self.server_info.supports_starttls() => {
                return Err(Error::TlsUnsupported);
            }
            TlsPolicy::Opportunistic | TlsPolicy::Required => {}
        }

        self.advance(TransactionState::TlsNegotiating);
        let reply = self.conn.send_command(&Command::StartTls).await?;
        if !reply.is(ReplyCode::SERVICE_READY) {
            return Err(Error::TlsNegotiationRejected(reply));
        }

        self.conn.starttls(self.tls).await?;

        // Nothing learned in plaintext is trusted after the upgrade.
        self.server_info.extensions.clear();
        self.ehlo().await?;
        self.advance(TransactionState::SecureEhloDone);
        Ok(())
    }

    async fn add_recipients(
        &mut self,
        group: &RecipientGroup,
    ) -> Result<(Vec<Address>, Vec<RecipientRejection>)> {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for recipient in &group.recipients {
            let reply = self
                .conn
                .send_command(&Command::RcptTo {
                    to: recipient.clone(),
                })
                .await?;

            if reply.is(ReplyCode::OK) || reply.is(ReplyCode::FORWARD) {
                accepted.push(recipient.clone());
            } else {
                warn!(recipient = %recipient, reply = %reply, "recipient rejected");
                rejected.push(RecipientRejection {
                    address: recipient.to_string(),
                    reply,
                });
            }
        }

        if accepted.is_empty() {
            return Err(Error::NoRecipientsAccepted(rejected));
        }
        Ok((accepted, rejected))
    }

    async fn send_data(&mut self, body: &[u8]) -> Result<Reply> {
        let reply = self.conn.send_command(&Command::Data).await?;
        if !reply.is(ReplyCode::START_DATA) {
            return Err(Error::DataRejected(reply));
        }
        self.advance(TransactionState::DataInProgress);

        let mut payload = dot_stuff(body);
        payload.extend_from_slice(DATA_TERMINATOR);
        self.conn.transport_mut().send(&payload).await?;

        let reply = self.conn.read_reply().await?;
        debug!(server = %self.conn.hostname(), reply = %reply, "end of data");
        if !reply.is(ReplyCode::OK) {
            return Err(Error::DataRejected(reply));
        }
        Ok(reply)
    }

    /// Best-effort QUIT, then release the socket.
    async fn quit(&mut self, await_reply: bool) {
        if self.conn.transport().is_open() {
            let sent = self
                .conn
                .transport_mut()
                .send(&Command::Quit.serialize())
                .await;
            if sent.is_ok() && await_reply {
                let _ = self.conn.read_reply().await;
            }
        }
        self.conn.transport_mut().shutdown().await;
    }

    fn advance(&mut self, next: TransactionState) {
        debug!(
            server = %self.conn.hostname(),
            from = ?self.state,
            to = ?next,
            "transition"
        );
        self.state = next;
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("conn", &self.conn)
            .field("state", &self.state)
            .field("server_info", &self.server_info)
            .finish_non_exhaustive()
    }
}
