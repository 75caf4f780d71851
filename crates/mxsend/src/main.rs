//! `mxsend` - deliver a message straight to each recipient's mail exchange
//!
//! Recipients are read from stdin, grouped by domain, and each group is
//! handed to the preferred MX of its domain over its own SMTP session.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod input;
mod message;
mod report;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mxsend_smtp::{Address, Config, DEFAULT_PORT, Envelope, Mailer, TlsPolicy, group_by_domain};

use message::{DEFAULT_BODY, OutgoingMessage};

/// Deliver a message directly to the mail exchanges of its recipients
#[derive(Parser, Debug)]
#[command(name = "mxsend")]
#[command(about = "Deliver a message directly to the mail exchanges of its recipients", long_about = None)]
#[command(version)]
struct Cli {
    /// Domain appended to recipients given without one
    domain: String,

    /// Sender address [default: postmaster@<HELO>]
    #[arg(long)]
    from: Option<String>,

    /// Name announced in EHLO
    #[arg(long, default_value = "localhost")]
    helo: String,

    /// Message subject
    #[arg(long, default_value = "Test message")]
    subject: String,

    /// File holding the message body
    #[arg(long)]
    body_file: Option<PathBuf>,

    /// Port of the mail exchanges
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// STARTTLS policy (required, opportunistic, disabled)
    #[arg(long, default_value = "required")]
    tls: TlsPolicy,

    /// Read/write timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 30)]
    connect_timeout: u64,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version are reported as errors that do not use stderr
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mxsend=info,mxsend_smtp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("mxsend: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every recipient was accepted.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = Config::builder(cli.helo.as_str())
        .port(cli.port)
        .tls(cli.tls)
        .io_timeout(Duration::from_secs(cli.timeout))
        .connect_timeout(Duration::from_secs(cli.connect_timeout))
        .build();

    let from = cli
        .from
        .clone()
        .unwrap_or_else(|| format!("postmaster@{}", cli.helo));
    let sender = Address::new(from.as_str()).context("invalid sender address")?;

    let body = match &cli.body_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read body file {}", path.display()))?,
        None => DEFAULT_BODY.to_string(),
    };

    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("Recipient(s), one per line, empty line to finish:");
    }
    let recipients =
        input::read_recipients(stdin.lock(), &cli.domain).context("cannot read recipients")?;
    if recipients.is_empty() {
        bail!("no recipients given");
    }

    let groups = group_by_domain(&recipients)?;
    debug!(
        recipients = recipients.len(),
        groups = groups.len(),
        "recipients grouped"
    );

    let message = OutgoingMessage {
        from: sender.as_str(),
        to: &recipients,
        subject: &cli.subject,
        body: &body,
    }
    .to_rfc5322(&chrono::Local::now());
    let envelope = Envelope::new(sender, message);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;

    let report = runtime.block_on(async {
        let mailer = Mailer::from_config(config).context("cannot set up DNS resolver")?;
        info!(groups = groups.len(), tls = ?mailer.config().tls, "starting delivery");
        anyhow::Ok(mailer.deliver(&envelope, &groups).await)
    })?;

    print!("{}", report::render(&report));
    Ok(report.is_success())
}
