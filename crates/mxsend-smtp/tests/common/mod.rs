//! Shared doubles for the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_test::io::Mock;

use mxsend_smtp::connection::BoxedStream;
use mxsend_smtp::{
    Address, Config, Connection, Connector, DnsLookup, Envelope, Error, MxRecord, Result,
    TlsPolicy, TlsProvider, Transport,
};

pub const HELO: &str = "client.test";
pub const GREETING: &[u8] = b"220 mx.example.com ESMTP ready\r\n";
pub const EHLO: &[u8] = b"EHLO client.test\r\n";
pub const QUIT: &[u8] = b"QUIT\r\n";
pub const BYE: &[u8] = b"221 bye\r\n";

/// TLS double that hands the stream back untouched.
pub struct Passthrough;

#[async_trait]
impl TlsProvider for Passthrough {
    async fn handshake(&self, stream: BoxedStream, _hostname: &str) -> Result<BoxedStream> {
        Ok(stream)
    }
}

/// TLS double whose handshake always fails.
pub struct Refuse;

#[async_trait]
impl TlsProvider for Refuse {
    async fn handshake(&self, _stream: BoxedStream, hostname: &str) -> Result<BoxedStream> {
        Err(Error::TlsHandshakeFailed {
            host: hostname.to_string(),
            reason: "certificate has expired".into(),
        })
    }
}

/// TLS double whose handshake never finishes in practice.
pub struct Stall;

#[async_trait]
impl TlsProvider for Stall {
    async fn handshake(&self, stream: BoxedStream, _hostname: &str) -> Result<BoxedStream> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(stream)
    }
}

/// DNS double backed by fixed tables.
#[derive(Default)]
pub struct StaticDns {
    pub mx: HashMap<String, Vec<MxRecord>>,
    pub hosts: HashMap<String, IpAddr>,
}

impl StaticDns {
    pub fn with_mx(mut self, domain: &str, exchange: &str, ip: [u8; 4]) -> Self {
        self.mx
            .entry(domain.to_string())
            .or_default()
            .push(MxRecord::new(10, exchange));
        self.hosts.insert(exchange.to_string(), IpAddr::from(ip));
        self
    }
}

#[async_trait]
impl DnsLookup for StaticDns {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>> {
        Ok(self.mx.get(domain).cloned().unwrap_or_default())
    }

    async fn resolve_host(&self, hostname: &str) -> Result<IpAddr> {
        self.hosts
            .get(hostname)
            .copied()
            .ok_or_else(|| Error::AddressResolutionFailed {
                host: hostname.to_string(),
                reason: "no such host".into(),
            })
    }
}

/// Connector that hands out scripted mocks in order and records where it
/// was asked to connect.
#[derive(Default)]
pub struct ScriptedConnector {
    scripts: Mutex<VecDeque<Mock>>,
    pub dialed: Mutex<Vec<SocketAddr>>,
}

impl ScriptedConnector {
    pub fn new(scripts: impl IntoIterator<Item = Mock>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            dialed: Mutex::default(),
        }
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, addr: SocketAddr) -> io::Result<BoxedStream> {
        self.dialed.lock().unwrap().push(addr);
        let mock = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| io::Error::from(io::ErrorKind::ConnectionRefused))?;
        Ok(Box::new(mock))
    }
}

pub fn config(tls: TlsPolicy) -> Config {
    Config::builder(HELO).tls(tls).build()
}

pub fn connection(mock: Mock) -> Connection {
    let transport = Transport::plain(Box::new(mock), Duration::from_secs(5));
    Connection::new(transport, "mx.example.com")
}

pub fn envelope(body: &str) -> Envelope {
    Envelope::new(Address::new("me@local.test").unwrap(), body)
}
