//! ESMTP service extensions.

/// A capability advertised on one EHLO reply line.
///
/// Only the keyword decides the variant; anything unrecognized keeps the
/// whole line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `STARTTLS` (RFC 3207)
    StartTls,
    /// `SIZE [limit]` (RFC 1870)
    Size(Option<usize>),
    /// `8BITMIME` (RFC 6152)
    EightBitMime,
    /// `PIPELINING` (RFC 2920)
    Pipelining,
    /// `SMTPUTF8` (RFC 6531)
    SmtpUtf8,
    /// `ENHANCEDSTATUSCODES` (RFC 2034)
    EnhancedStatusCodes,
    /// Any other line, verbatim.
    Unknown(String),
}

impl Extension {
    /// Interprets the text of an EHLO line after the code.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let (keyword, params) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));

        if keyword.eq_ignore_ascii_case("STARTTLS") {
            Self::StartTls
        } else if keyword.eq_ignore_ascii_case("SIZE") {
            Self::Size(params.trim().parse().ok())
        } else if keyword.eq_ignore_ascii_case("8BITMIME") {
            Self::EightBitMime
        } else if keyword.eq_ignore_ascii_case("PIPELINING") {
            Self::Pipelining
        } else if keyword.eq_ignore_ascii_case("SMTPUTF8") {
            Self::SmtpUtf8
        } else if keyword.eq_ignore_ascii_case("ENHANCEDSTATUSCODES") {
            Self::EnhancedStatusCodes
        } else {
            Self::Unknown(line.to_string())
        }
    }
}
