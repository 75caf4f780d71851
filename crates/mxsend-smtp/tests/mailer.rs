//! Integration tests for multi-domain delivery.

#![allow(clippy::unwrap_used)]

mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_test::io::{Builder, Mock};

use common::{BYE, EHLO, GREETING, Passthrough, QUIT, ScriptedConnector, StaticDns, envelope};
use mxsend_smtp::{Config, Error, Mailer, SecurityMode, TlsPolicy, group_by_domain};

fn accepting_session(rcpts: &[&str]) -> Mock {
    let mut builder = Builder::new();
    builder
        .read(GREETING)
        .write(EHLO)
        .read(b"250-mx.example.com\r\n250 STARTTLS\r\n")
        .write(b"STARTTLS\r\n")
        .read(b"220 go ahead\r\n")
        .write(EHLO)
        .read(b"250 mx.example.com\r\n")
        .write(b"MAIL FROM:<me@local.test>\r\n")
        .read(b"250 ok\r\n");
    for rcpt in rcpts {
        builder
            .write(format!("RCPT TO:<{rcpt}>\r\n").as_bytes())
            .read(b"250 ok\r\n");
    }
    builder
        .write(b"DATA\r\n")
        .read(b"354 go ahead\r\n")
        .write(b"Subject: hi\r\n\r\nhi\r\n.\r\n")
        .read(b"250 queued\r\n")
        .write(QUIT)
        .read(BYE)
        .build()
}

fn mailer(dns: StaticDns, connector: Arc<ScriptedConnector>) -> Mailer {
    let config = Config::builder("client.test")
        .port(2525)
        .tls(TlsPolicy::Required)
        .build();
    Mailer::new(config, Arc::new(dns), connector, Arc::new(Passthrough))
}

#[tokio::test]
async fn test_one_session_per_domain() {
    let dns = StaticDns::default()
        .with_mx("x.test", "mx.x.test", [192, 0, 2, 1])
        .with_mx("z.test", "mx.z.test", [192, 0, 2, 3]);
    let connector = Arc::new(ScriptedConnector::new([
        accepting_session(&["a@x.test", "c@x.test"]),
        accepting_session(&["b@z.test"]),
    ]));
    let mailer = mailer(dns, Arc::clone(&connector));

    let groups = group_by_domain(["a@x.test", "b@z.test", "c@x.test", "a@x.test"]).unwrap();
    let report = mailer
        .deliver(&envelope("Subject: hi\n\nhi\n"), &groups)
        .await;

    assert!(report.is_success());
    assert_eq!(report.accepted_count(), 3);
    let servers: Vec<(&str, SecurityMode)> = report
        .groups
        .iter()
        .map(|g| {
            let r = g.result.as_ref().unwrap();
            (r.server.as_str(), r.security)
        })
        .collect();
    assert_eq!(
        servers,
        vec![
            ("mx.x.test", SecurityMode::Tls),
            ("mx.z.test", SecurityMode::Tls)
        ]
    );

    let dialed = connector.dialed.lock().unwrap().clone();
    let expected: Vec<SocketAddr> = vec![
        "192.0.2.1:2525".parse().unwrap(),
        "192.0.2.3:2525".parse().unwrap(),
    ];
    assert_eq!(dialed, expected);
}

#[tokio::test]
async fn test_failed_domain_does_not_block_the_next() {
    let dns = StaticDns::default()
        .with_mx("x.test", "mx.x.test", [192, 0, 2, 1])
        .with_mx("z.test", "mx.z.test", [192, 0, 2, 3]);
    let connector = Arc::new(ScriptedConnector::new([
        accepting_session(&["a@x.test"]),
        accepting_session(&["c@z.test"]),
    ]));
    let mailer = mailer(dns, Arc::clone(&connector));

    let groups = group_by_domain(["a@x.test", "b@nomx.test", "c@z.test"]).unwrap();
    let report = mailer.deliver(&envelope("Subject: hi\r\n\r\nhi"), &groups).await;

    assert!(!report.is_success());
    assert_eq!(report.groups.len(), 3);
    assert!(report.groups[0].result.is_ok());
    assert!(matches!(
        &report.groups[1].result,
        Err(Error::NoMailServer(domain)) if domain == "nomx.test"
    ));
    assert_eq!(report.groups[1].recipients[0].as_str(), "b@nomx.test");
    assert!(report.groups[2].result.is_ok());
    assert_eq!(connector.dialed.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_refused_connection_is_reported_per_group() {
    let dns = StaticDns::default().with_mx("x.test", "mx.x.test", [192, 0, 2, 1]);
    let connector = Arc::new(ScriptedConnector::default());
    let mailer = mailer(dns, connector);

    let groups = group_by_domain(["a@x.test"]).unwrap();
    let report = mailer.deliver(&envelope("hi"), &groups).await;

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0],
        ("x.test", Error::ConnectionError { host, .. }) if host == "mx.x.test"
    ));
}
