//! TLS session establishment for STARTTLS.

use std::sync::Arc;

use async_trait::async_trait;
use rustls::pki_types::ServerName;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::debug;

use super::stream::BoxedStream;
use crate::error::{Error, Result};

/// Upgrades an established stream to TLS.
#[async_trait]
pub trait TlsProvider: Send + Sync {
    /// Runs the client handshake over `stream`, verifying the peer as `hostname`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TlsHandshakeFailed`] on any certificate or negotiation
    /// error.
    async fn handshake(&self, stream: BoxedStream, hostname: &str) -> Result<BoxedStream>;
}

/// rustls-backed provider.
///
/// Only TLS 1.2 and 1.3 are offered. Certificates are verified against the
/// webpki trust anchors, and SNI plus hostname verification use the
/// exchange name.
#[derive(Clone)]
pub struct RustlsProvider {
    connector: TlsConnector,
}

impl RustlsProvider {
    /// Builds the client context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connector: TlsConnector::from(Arc::new(create_context())),
        }
    }

    /// Uses a caller-supplied client configuration.
    #[must_use]
    pub fn with_config(config: Arc<ClientConfig>) -> Self {
        Self {
            connector: TlsConnector::from(config),
        }
    }
}

impl Default for RustlsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RustlsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustlsProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl TlsProvider for RustlsProvider {
    async fn handshake(&self, stream: BoxedStream, hostname: &str) -> Result<BoxedStream> {
        let failed = |reason: String| Error::TlsHandshakeFailed {
            host: hostname.to_string(),
            reason,
        };

        let server_name = ServerName::try_from(hostname.to_string())
            .map_err(|e| failed(format!("invalid server name: {e}")))?;

        let tls = self
            .connector
            .connect(server_name, stream)
            .await
            .map_err(|e| failed(e.to_string()))?;

        let (_, session) = tls.get_ref();
        debug!(
            host = hostname,
            version = ?session.protocol_version(),
            cipher = ?session.negotiated_cipher_suite().map(|s| s.suite()),
            "TLS established"
        );

        Ok(Box::new(tls))
    }
}

/// Creates the client TLS context: TLS 1.2 minimum, peer verification on.
#[must_use]
pub fn create_context() -> ClientConfig {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    ClientConfig::builder_with_protocol_versions(&[
        &rustls::version::TLS13,
        &rustls::version::TLS12,
    ])
    .with_root_certificates(root_store)
    .with_no_client_auth()
}
