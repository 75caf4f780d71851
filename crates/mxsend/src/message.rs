//! RFC 5322 message composition.

use std::fmt::Write;

use chrono::{DateTime, TimeZone};

/// Text sent when no body file is given.
pub const DEFAULT_BODY: &str = "This message was delivered directly to your mail exchange.\n";

/// A plain-text message ready to be handed to the mailer.
#[derive(Debug, Clone)]
pub struct OutgoingMessage<'a> {
    pub from: &'a str,
    pub to: &'a [String],
    pub subject: &'a str,
    pub body: &'a str,
}

impl OutgoingMessage<'_> {
    /// Renders headers and body with CRLF line endings.
    pub fn to_rfc5322<Tz>(&self, date: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut message = String::new();

        let _ = write!(message, "From: {}\r\n", self.from);
        if !self.to.is_empty() {
            let _ = write!(message, "To: {}\r\n", self.to.join(", "));
        }
        let _ = write!(message, "Subject: {}\r\n", single_line(self.subject));
        let _ = write!(message, "Date: {}\r\n", date.to_rfc2822());
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        message.push_str("Content-Transfer-Encoding: 8bit\r\n");

        message.push_str("\r\n");

        for line in self.body.lines() {
            message.push_str(line);
            message.push_str("\r\n");
        }

        message
    }
}

/// Folds any line breaks out of a header value.
fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
