//! Server replies and status codes.

/// A complete SMTP reply from the server.
///
/// A reply is one or more CRLF-terminated lines sharing a single status code.
/// Every line but the last uses `-` after the code; the last uses a space.
/// Replies are immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    code: ReplyCode,
    lines: Vec<String>,
    raw: String,
}

impl Reply {
    /// Creates a reply from a code and its text lines, synthesizing the wire form.
    #[must_use]
    pub fn new(code: ReplyCode, lines: Vec<String>) -> Self {
        use std::fmt::Write;

        let mut raw = String::new();
        let last = lines.len().saturating_sub(1);
        for (i, line) in lines.iter().enumerate() {
            let sep = if i == last { ' ' } else { '-' };
            let _ = write!(raw, "{code}{sep}{line}\r\n");
        }
        if lines.is_empty() {
            raw = format!("{code} \r\n");
        }
        Self { code, lines, raw }
    }

    /// Creates a reply from already-validated parts read off the wire.
    pub(crate) const fn from_wire(code: ReplyCode, lines: Vec<String>, raw: String) -> Self {
        Self { code, lines, raw }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn code(&self) -> ReplyCode {
        self.code
    }

    /// Returns the text of each line, without code and separator.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the reply exactly as received, including CRLFs.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns true if the reply carries the given code.
    #[must_use]
    pub fn is(&self, code: ReplyCode) -> bool {
        self.code == code
    }

    /// Returns the class of the status code.
    #[must_use]
    pub const fn class(&self) -> ReplyClass {
        self.code.class()
    }

    /// 2xx: the command succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.class(), ReplyClass::Completion)
    }

    /// 4xx: the command failed but may succeed if retried later.
    #[must_use]
    pub const fn is_transient_error(&self) -> bool {
        matches!(self.class(), ReplyClass::TransientFailure)
    }

    /// 5xx: the command failed and retrying will not help.
    #[must_use]
    pub const fn is_permanent_error(&self) -> bool {
        matches!(self.class(), ReplyClass::PermanentFailure)
    }

    /// Text lines joined with `\n`.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.lines.join(" "))
    }
}

/// First-digit class of a reply code (RFC 5321 section 4.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    /// 2yz
    Completion,
    /// 3yz
    Intermediate,
    /// 4yz
    TransientFailure,
    /// 5yz
    PermanentFailure,
    /// Anything outside 200..=599.
    Unknown,
}

/// Three-digit SMTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// Greeting.
    pub const SERVICE_READY: Self = Self(220);
    /// Reply to QUIT.
    pub const CLOSING: Self = Self(221);
    /// Action completed.
    pub const OK: Self = Self(250);
    /// Recipient not local, server will forward.
    pub const FORWARD: Self = Self(251);
    /// Go ahead with the message content.
    pub const START_DATA: Self = Self(354);
    /// Server is shutting the channel down.
    pub const SERVICE_UNAVAILABLE: Self = Self(421);
    /// Mailbox temporarily unavailable.
    pub const MAILBOX_BUSY: Self = Self(450);
    /// Mailbox does not exist or refuses mail.
    pub const MAILBOX_UNAVAILABLE: Self = Self(550);
    /// Transaction failed, or no service at greeting time.
    pub const TRANSACTION_FAILED: Self = Self(554);

    /// Wraps a raw code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// The code as a number.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Classifies the code by its first digit.
    #[must_use]
    pub const fn class(self) -> ReplyClass {
        match self.0 / 100 {
            2 => ReplyClass::Completion,
            3 => ReplyClass::Intermediate,
            4 => ReplyClass::TransientFailure,
            5 => ReplyClass::PermanentFailure,
            _ => ReplyClass::Unknown,
        }
    }

    /// 2yz.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self.class(), ReplyClass::Completion)
    }

    /// 3yz.
    #[must_use]
    pub const fn is_intermediate(self) -> bool {
        matches!(self.class(), ReplyClass::Intermediate)
    }

    /// 4yz.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self.class(), ReplyClass::TransientFailure)
    }

    /// 5yz.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self.class(), ReplyClass::PermanentFailure)
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(ReplyCode::new(199).class(), ReplyClass::Unknown);
        assert_eq!(ReplyCode::new(600).class(), ReplyClass::Unknown);
        assert_eq!(ReplyCode::CLOSING.class(), ReplyClass::Completion);
        assert!(ReplyCode::OK.is_success());
        assert!(ReplyCode::START_DATA.is_intermediate());
        assert!(ReplyCode::MAILBOX_BUSY.is_transient());
        assert!(ReplyCode::TRANSACTION_FAILED.is_permanent());
        assert!(!ReplyCode::SERVICE_READY.is_permanent());
    }

    #[test]
    fn code_display_is_three_digits() {
        assert_eq!(ReplyCode::OK.to_string(), "250");
        assert_eq!(ReplyCode::new(42).to_string(), "042");
    }

    #[test]
    fn new_synthesizes_raw_with_markers() {
        let reply = Reply::new(
            ReplyCode::OK,
            vec!["mx.example.com".to_string(), "STARTTLS".to_string()],
        );
        assert_eq!(reply.raw(), "250-mx.example.com\r\n250 STARTTLS\r\n");
        assert_eq!(reply.lines().len(), 2);
    }

    #[test]
    fn new_without_lines() {
        let reply = Reply::new(ReplyCode::OK, vec![]);
        assert_eq!(reply.raw(), "250 \r\n");
        assert_eq!(reply.message_text(), "");
    }

    #[test]
    fn display_joins_lines() {
        let reply = Reply::new(
            ReplyCode::MAILBOX_UNAVAILABLE,
            vec!["5.1.1 User unknown".to_string(), "see docs".to_string()],
        );
        assert_eq!(reply.to_string(), "550 5.1.1 User unknown see docs");
        assert!(reply.is_permanent_error());
        assert!(reply.is(ReplyCode::MAILBOX_UNAVAILABLE));
    }
}
