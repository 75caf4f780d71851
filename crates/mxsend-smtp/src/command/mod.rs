//! Commands the delivery client sends.

use std::fmt;

use crate::types::Address;

/// One client command line.
///
/// `Display` renders the line without its terminator; [`Command::serialize`]
/// adds the CRLF for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `EHLO <name>`
    Ehlo {
        /// Name the client announces.
        hostname: String,
    },
    /// `STARTTLS`
    StartTls,
    /// `MAIL FROM:<sender>`
    MailFrom {
        /// Reverse path.
        from: Address,
    },
    /// `RCPT TO:<recipient>`
    RcptTo {
        /// Forward path.
        to: Address,
    },
    /// `DATA`
    Data,
    /// `QUIT`
    Quit,
}

impl Command {
    /// Wire bytes of the command, CRLF included.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        format!("{self}\r\n").into_bytes()
    }

    /// Command name without arguments, for logs.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Ehlo { .. } => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::MailFrom { .. } => "MAIL FROM",
            Self::RcptTo { .. } => "RCPT TO",
            Self::Data => "DATA",
            Self::Quit => "QUIT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo { hostname } => write!(f, "EHLO {hostname}"),
            Self::MailFrom { from } => write!(f, "MAIL FROM:<{from}>"),
            Self::RcptTo { to } => write!(f, "RCPT TO:<{to}>"),
            other => f.write_str(other.verb()),
        }
    }
}
