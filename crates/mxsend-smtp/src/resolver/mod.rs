//! Mail server discovery.
//!
//! A domain's MX records are queried, the exchange with the lowest
//! preference wins (first answer wins ties), and its hostname is resolved
//! to a socket address. Nothing is cached: every call queries again.

mod hickory;

pub use hickory::HickoryDns;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};

/// A mail exchange published for a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    /// Preference; lower values are tried first.
    pub preference: u16,
    /// Exchange hostname.
    pub exchange: String,
}

impl MxRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// The exchange chosen for a domain, ready to connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    /// Exchange hostname, used for TLS verification.
    pub hostname: String,
    /// Socket address of the exchange.
    pub addr: SocketAddr,
}

/// DNS queries needed for delivery.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Returns the MX records of `domain` in answer order.
    ///
    /// A domain without MX records yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsLookupFailed`] if the query fails.
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>>;

    /// Resolves a hostname to an address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AddressResolutionFailed`] if the name has no address.
    async fn resolve_host(&self, hostname: &str) -> Result<IpAddr>;
}

/// Picks the record with the lowest preference, keeping answer order on ties.
#[must_use]
pub fn select_preferred(records: &[MxRecord]) -> Option<&MxRecord> {
    records.iter().min_by_key(|record| record.preference)
}

/// Turns a domain into a connectable server address.
#[derive(Clone)]
pub struct ServerResolver {
    dns: Arc<dyn DnsLookup>,
    port: u16,
}

impl ServerResolver {
    /// Creates a resolver that produces addresses on `port`.
    #[must_use]
    pub fn new(dns: Arc<dyn DnsLookup>, port: u16) -> Self {
        Self { dns, port }
    }

    /// Resolves the preferred mail exchange of `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMailServer`] if the domain has no MX records,
    /// [`Error::DnsLookupFailed`] if the query fails, and
    /// [`Error::AddressResolutionFailed`] if the exchange has no address.
    pub async fn resolve(&self, domain: &str) -> Result<ServerAddress> {
        let records = self.dns.lookup_mx(domain).await?;
        let Some(best) = select_preferred(&records) else {
            return Err(Error::NoMailServer(domain.to_string()));
        };
        debug!(
            domain,
            exchange = %best.exchange,
            preference = best.preference,
            candidates = records.len(),
            "selected mail exchange"
        );

        let ip = self.dns.resolve_host(&best.exchange).await?;
        Ok(ServerAddress {
            hostname: best.exchange.clone(),
            addr: SocketAddr::new(ip, self.port),
        })
    }
}

impl std::fmt::Debug for ServerResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerResolver")
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}
