//! DNS lookups through hickory-resolver.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::{
    TokioResolver,
    config::{ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
};
use tracing::{debug, warn};

use super::{DnsLookup, MxRecord};
use crate::error::{Error, Result};

/// [`DnsLookup`] backed by the system resolver configuration.
#[derive(Debug)]
pub struct HickoryDns {
    resolver: TokioResolver,
}

impl HickoryDns {
    /// Creates a resolver from the system configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DnsLookupFailed`] if the system configuration cannot
    /// be loaded.
    pub fn new(timeout: Duration) -> Result<Self> {
        let resolver = TokioResolver::builder(TokioConnectionProvider::default())
            .map_err(|e| system_config_error(&e))?
            .with_options(options(timeout))
            .build();

        Ok(Self { resolver })
    }

    /// Creates a resolver with an explicit upstream configuration.
    #[must_use]
    pub fn with_config(config: ResolverConfig, timeout: Duration) -> Self {
        let resolver =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
                .with_options(options(timeout))
                .build();

        Self { resolver }
    }
}

fn options(timeout: Duration) -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts
}

/// Stands in for the domain when no lookup has started yet.
const SYSTEM_CONFIG: &str = "<system config>";

fn system_config_error(err: &dyn std::fmt::Display) -> Error {
    Error::DnsLookupFailed {
        domain: SYSTEM_CONFIG.to_string(),
        reason: format!("cannot load system resolver configuration: {err}"),
    }
}

/// Strips the root label dot from a fully qualified name.
fn trim_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

#[async_trait]
impl DnsLookup for HickoryDns {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>> {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|mx| {
                    let exchange = mx.exchange().to_utf8();
                    let record = MxRecord::new(mx.preference(), trim_root(&exchange));
                    debug!(
                        domain,
                        exchange = %record.exchange,
                        preference = record.preference,
                        "MX record"
                    );
                    record
                })
                .collect()),
            Err(err) if err.is_no_records_found() => {
                debug!(domain, "no MX records");
                Ok(Vec::new())
            }
            Err(err) => {
                warn!(domain, error = %err, "MX lookup failed");
                Err(Error::DnsLookupFailed {
                    domain: domain.to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }

    async fn resolve_host(&self, hostname: &str) -> Result<IpAddr> {
        let failed = |reason: String| Error::AddressResolutionFailed {
            host: hostname.to_string(),
            reason,
        };

        let lookup = self
            .resolver
            .lookup_ip(hostname)
            .await
            .map_err(|e| failed(e.to_string()))?;

        lookup
            .iter()
            .next()
            .ok_or_else(|| failed("no addresses returned".into()))
    }
}
