//! # mxsend-smtp
//!
//! Direct-to-MX SMTP delivery (RFC 5321).
//!
//! ## Features
//!
//! - **MX discovery**: the lowest-preference exchange of each recipient domain
//! - **Strict reply parsing**: multi-line replies, bounded size, no trailing data
//! - **STARTTLS**: required by default, with opportunistic and disabled policies
//! - **Per-recipient outcomes**: refused recipients are reported, not fatal
//!
//! ## Quick Start
//!
//! ```ignore
//! use mxsend_smtp::{Address, Config, Envelope, Mailer, group_by_domain};
//!
//! #[tokio::main]
//! async fn main() -> mxsend_smtp::Result<()> {
//!     let mailer = Mailer::from_config(Config::new("client.example.com"))?;
//!
//!     let sender = Address::new("me@example.com")?;
//!     let envelope = Envelope::new(sender, "Subject: Hi\r\n\r\nHello!\r\n");
//!     let groups = group_by_domain(["a@example.org", "b@example.net"])?;
//!
//!     let report = mailer.deliver(&envelope, &groups).await;
//!     for (domain, err) in report.failures() {
//!         eprintln!("{domain}: {err}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! Connected ─► Greeted ─► EhloDone ─► [TlsNegotiating ─► SecureEhloDone]
//!           ─► SenderSet ─► RecipientsSet ─► DataInProgress ─► Completed
//! ```
//!
//! ## Modules
//!
//! - [`resolver`]: MX lookup and exchange selection
//! - [`connection`]: Transport, TLS upgrade and reply reading
//! - [`parser`]: Reply parser
//! - [`transaction`]: Session state machine and delivery reports
//! - [`recipients`]: Grouping recipients by domain
//! - [`body`]: Dot-stuffing for the DATA phase

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod body;
pub mod command;
pub mod config;
pub mod connection;
mod error;
mod mailer;
pub mod parser;
pub mod recipients;
pub mod resolver;
pub mod transaction;
pub mod types;

pub use config::{Config, ConfigBuilder, DEFAULT_PORT, TlsPolicy};
pub use connection::{
    Connection, Connector, RustlsProvider, SecurityMode, ServerInfo, TcpConnector, TlsProvider,
    Transport,
};
pub use error::{Error, RecipientRejection, Result};
pub use mailer::Mailer;
pub use recipients::{RecipientGroup, group_by_domain};
pub use resolver::{DnsLookup, HickoryDns, MxRecord, ServerAddress, ServerResolver};
pub use transaction::{
    DeliveryReport, Envelope, GroupDelivery, GroupReport, Transaction, TransactionState,
};
pub use types::{Address, Extension, Reply, ReplyClass, ReplyCode};
