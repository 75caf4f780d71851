//! SMTP reply parser.
//!
//! Replies arrive as CRLF-terminated lines:
//! - Single: `250 OK\r\n`
//! - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
//!
//! [`parse_reply`] works on whatever has been accumulated so far and reports
//! whether a complete reply is present. A reply is complete only when its
//! space-marked line is the last line in the buffer.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Maximum size of a single accumulated reply.
pub const MAX_REPLY_LEN: usize = 64 * 1024;

/// One line of a reply, split at the code and separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyLine<'a> {
    /// Status code of this line.
    pub code: ReplyCode,
    /// True for the space separator, false for `-`.
    pub is_last: bool,
    /// Text after the separator.
    pub text: &'a str,
}

/// Parses a single reply line (without its CRLF).
///
/// # Errors
///
/// Returns [`Error::MalformedReply`] if the line is shorter than 4 characters,
/// does not start with three digits, or has neither `-` nor space as its
/// fourth character.
pub fn parse_reply_line(line: &str) -> Result<ReplyLine<'_>> {
    let bytes = line.as_bytes();
    if bytes.len() < 4 {
        return Err(Error::MalformedReply(format!(
            "reply line too short: {line:?}"
        )));
    }

    if !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(Error::MalformedReply(format!(
            "invalid reply code: {line:?}"
        )));
    }
    let code = u16::from(bytes[0] - b'0') * 100
        + u16::from(bytes[1] - b'0') * 10
        + u16::from(bytes[2] - b'0');

    let is_last = match bytes[3] {
        b' ' => true,
        b'-' => false,
        _ => {
            return Err(Error::MalformedReply(format!(
                "invalid continuation marker: {line:?}"
            )));
        }
    };

    Ok(ReplyLine {
        code: ReplyCode::new(code),
        is_last,
        text: &line[4..],
    })
}

/// Attempts to parse a complete reply from accumulated bytes.
///
/// Returns `Ok(None)` while more input is needed.
///
/// # Errors
///
/// Returns [`Error::MalformedReply`] if any complete line is invalid, codes
/// differ between lines, data follows the final line, the text is not UTF-8,
/// or the reply grows past [`MAX_REPLY_LEN`].
pub fn parse_reply(buf: &[u8]) -> Result<Option<Reply>> {
    let mut code: Option<ReplyCode> = None;
    let mut lines = Vec::new();
    let mut pos = 0;

    while let Some(end) = find_crlf(&buf[pos..]) {
        let line = std::str::from_utf8(&buf[pos..pos + end])
            .map_err(|_| Error::MalformedReply("reply is not valid UTF-8".into()))?;
        let parsed = parse_reply_line(line)?;

        match code {
            None => code = Some(parsed.code),
            Some(expected) if expected != parsed.code => {
                return Err(Error::MalformedReply(format!(
                    "reply code changed from {expected} to {} mid-reply",
                    parsed.code
                )));
            }
            Some(_) => {}
        }

        lines.push(parsed.text.to_string());
        pos += end + 2;

        if parsed.is_last {
            if pos != buf.len() {
                return Err(Error::MalformedReply(format!(
                    "{} unexpected bytes after final reply line",
                    buf.len() - pos
                )));
            }
            // Every byte up to `pos` was validated line by line above.
            let raw = String::from_utf8_lossy(&buf[..pos]).into_owned();
            return Ok(code.map(|code| Reply::from_wire(code, lines, raw)));
        }
    }

    if buf.len() > MAX_REPLY_LEN {
        return Err(Error::MalformedReply(format!(
            "reply exceeds {MAX_REPLY_LEN} bytes"
        )));
    }

    Ok(None)
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line_reply() {
        let reply = parse_reply(b"250 OK\r\n").unwrap().unwrap();
        assert_eq!(reply.code().as_u16(), 250);
        assert_eq!(reply.lines(), ["OK"]);
        assert_eq!(reply.raw(), "250 OK\r\n");
    }

    #[test]
    fn test_parse_multi_line_reply() {
        let reply = parse_reply(b"250-PIPELINING\r\n250 STARTTLS\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(reply.code(), ReplyCode::OK);
        assert_eq!(reply.lines(), ["PIPELINING", "STARTTLS"]);
    }

    #[test]
    fn test_parse_greeting() {
        let reply = parse_reply(b"220 smtp.example.com ESMTP ready\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(reply.code(), ReplyCode::SERVICE_READY);
        assert_eq!(reply.message_text(), "smtp.example.com ESMTP ready");
    }

    #[test]
    fn test_incomplete_needs_more_input() {
        assert!(parse_reply(b"").unwrap().is_none());
        assert!(parse_reply(b"250-PIPELI").unwrap().is_none());
        assert!(parse_reply(b"250-PIPELINING\r\n").unwrap().is_none());
        assert!(parse_reply(b"250-PIPELINING\r\n250 STAR").unwrap().is_none());
        assert!(parse_reply(b"250 OK").unwrap().is_none());
    }

    #[test]
    fn test_short_line_is_malformed() {
        assert!(matches!(
            parse_reply(b"25\r\n"),
            Err(Error::MalformedReply(_))
        ));
        assert!(matches!(
            parse_reply(b"250\r\n"),
            Err(Error::MalformedReply(_))
        ));
        assert!(matches!(
            parse_reply(b"250-a\r\n\r\n"),
            Err(Error::MalformedReply(_))
        ));
    }

    #[test]
    fn test_code_mismatch_is_malformed() {
        assert!(matches!(
            parse_reply(b"250-first\r\n251 second\r\n"),
            Err(Error::MalformedReply(_))
        ));
    }

    #[test]
    fn test_invalid_code_and_marker() {
        assert!(parse_reply(b"ABC OK\r\n").is_err());
        assert!(parse_reply(b"250_OK\r\n").is_err());
    }

    #[test]
    fn test_non_utf8_text_is_malformed() {
        assert!(matches!(
            parse_reply(b"250 caf\xe9\r\n"),
            Err(Error::MalformedReply(_))
        ));
        assert!(matches!(
            parse_reply(b"250-ok\r\n250 caf\xe9\r\n"),
            Err(Error::MalformedReply(_))
        ));
    }

    #[test]
    fn test_space_line_followed_by_more_data_is_rejected() {
        // A final-looking line that is not the last accumulated line.
        assert!(matches!(
            parse_reply(b"250 first\r\n250-second\r\n250 third\r\n"),
            Err(Error::MalformedReply(_))
        ));
        assert!(matches!(
            parse_reply(b"220 ready\r\ngarbage"),
            Err(Error::MalformedReply(_))
        ));
    }

    #[test]
    fn test_text_with_space_at_fourth_column_of_text() {
        let reply = parse_reply(b"250-abc def\r\n250 ok\r\n").unwrap().unwrap();
        assert_eq!(reply.lines(), ["abc def", "ok"]);
    }

    #[test]
    fn test_empty_text_after_space() {
        let reply = parse_reply(b"250 \r\n").unwrap().unwrap();
        assert_eq!(reply.lines(), [""]);
    }

    #[test]
    fn test_oversized_reply() {
        let mut buf = Vec::new();
        while buf.len() <= MAX_REPLY_LEN {
            buf.extend_from_slice(b"250-xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx\r\n");
        }
        assert!(matches!(
            parse_reply(&buf),
            Err(Error::MalformedReply(_))
        ));
    }

    #[test]
    fn test_parse_reply_line() {
        let line = parse_reply_line("354 Start mail input").unwrap();
        assert_eq!(line.code, ReplyCode::START_DATA);
        assert!(line.is_last);
        assert_eq!(line.text, "Start mail input");

        let line = parse_reply_line("250-SIZE 1000").unwrap();
        assert!(!line.is_last);
    }
}
