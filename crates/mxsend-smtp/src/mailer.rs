//! Delivery of one message to many recipient groups.

use std::sync::Arc;

use tracing::{Instrument, info, info_span};

use crate::config::Config;
use crate::connection::{
    Connection, Connector, RustlsProvider, TcpConnector, TlsProvider, Transport,
};
use crate::error::{Error, Result};
use crate::recipients::RecipientGroup;
use crate::resolver::{DnsLookup, HickoryDns, ServerResolver};
use crate::transaction::{DeliveryReport, Envelope, GroupDelivery, GroupReport, Transaction};

/// Delivers a message group by group, one connection per group.
///
/// Groups are processed one after another. A failed group is recorded in the
/// report and does not stop the groups after it.
pub struct Mailer {
    config: Config,
    resolver: ServerResolver,
    connector: Arc<dyn Connector>,
    tls: Arc<dyn TlsProvider>,
}

impl Mailer {
    /// Creates a mailer from explicit capabilities.
    #[must_use]
    pub fn new(
        config: Config,
        dns: Arc<dyn DnsLookup>,
        connector: Arc<dyn Connector>,
        tls: Arc<dyn TlsProvider>,
    ) -> Self {
        let resolver = ServerResolver::new(dns, config.port);
        Self {
            config,
            resolver,
            connector,
            tls,
        }
    }

    /// Creates a mailer using system DNS, TCP, and rustls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsLookupFailed`] if the system resolver
    /// configuration cannot be loaded.
    pub fn from_config(config: Config) -> Result<Self> {
        let dns = HickoryDns::new(config.dns_timeout)?;
        let connector = TcpConnector::new(config.connect_timeout);
        Ok(Self::new(
            config,
            Arc::new(dns),
            Arc::new(connector),
            Arc::new(RustlsProvider::new()),
        ))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Delivers `envelope` to every group in order.
    pub async fn deliver(
        &self,
        envelope: &Envelope,
        groups: &[RecipientGroup],
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for group in groups {
            let span = info_span!("group", domain = %group.domain);
            let result = self.deliver_group(envelope, group).instrument(span).await;
            report.groups.push(GroupDelivery {
                domain: group.domain.clone(),
                recipients: group.recipients.clone(),
                result,
            });
        }

        info!(
            groups = report.groups.len(),
            accepted = report.accepted_count(),
            failed = report.failures().count(),
            "delivery finished"
        );
        report
    }

    /// Resolves, connects, and runs one transaction for `group`.
    ///
    /// # Errors
    ///
    /// Returns any resolution, connection, or transaction error.
    pub async fn deliver_group(
        &self,
        envelope: &Envelope,
        group: &RecipientGroup,
    ) -> Result<GroupReport> {
        let server = self.resolver.resolve(&group.domain).await?;
        info!(exchange = %server.hostname, addr = %server.addr, "connecting");

        let stream = self
            .connector
            .connect(server.addr)
            .await
            .map_err(|source| Error::ConnectionError {
                host: server.hostname.clone(),
                source,
            })?;

        let transport = Transport::plain(stream, self.config.io_timeout);
        let conn = Connection::new(transport, server.hostname);
        Transaction::new(conn, &self.config, self.tls.as_ref())
            .run(envelope, group)
            .await
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
