//! Delivery configuration types.

use std::time::Duration;

/// Default SMTP relay port.
pub const DEFAULT_PORT: u16 = 25;

/// When to upgrade a session with STARTTLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsPolicy {
    /// Never upgrade. **Not recommended.**
    Disabled,
    /// Upgrade when the server advertises STARTTLS, otherwise stay plaintext.
    Opportunistic,
    /// Fail the delivery unless the session can be upgraded. **Default.**
    #[default]
    Required,
}

impl std::str::FromStr for TlsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disabled" | "none" => Ok(Self::Disabled),
            "opportunistic" => Ok(Self::Opportunistic),
            "required" => Ok(Self::Required),
            other => Err(format!("unknown TLS policy: {other}")),
        }
    }
}

/// Delivery configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name announced in EHLO.
    pub helo_name: String,
    /// Port of the remote mail exchange.
    pub port: u16,
    /// STARTTLS policy.
    pub tls: TlsPolicy,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Per-call read/write timeout.
    pub io_timeout: Duration,
    /// DNS query timeout.
    pub dns_timeout: Duration,
}

impl Config {
    /// Creates a configuration with defaults and the given EHLO name.
    #[must_use]
    pub fn new(helo_name: impl Into<String>) -> Self {
        ConfigBuilder::new(helo_name).build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(helo_name: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(helo_name)
    }
}

/// Builder for delivery configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    helo_name: String,
    port: u16,
    tls: TlsPolicy,
    connect_timeout: Duration,
    io_timeout: Duration,
    dns_timeout: Duration,
}

impl ConfigBuilder {
    /// Creates a new builder with the given EHLO name.
    #[must_use]
    pub fn new(helo_name: impl Into<String>) -> Self {
        Self {
            helo_name: helo_name.into(),
            port: DEFAULT_PORT,
            tls: TlsPolicy::default(),
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
            dns_timeout: Duration::from_secs(5),
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the STARTTLS policy.
    #[must_use]
    pub const fn tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the I/O timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Sets the DNS query timeout.
    #[must_use]
    pub const fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            helo_name: self.helo_name,
            port: self.port,
            tls: self.tls,
            connect_timeout: self.connect_timeout,
            io_timeout: self.io_timeout,
            dns_timeout: self.dns_timeout,
        }
    }
}
