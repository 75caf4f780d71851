//! Email address types.

use crate::error::{Error, Result};

/// Email address for the SMTP envelope.
///
/// The domain is the text after the first `@` and is located once, at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    addr: String,
    at: usize,
}

impl Address {
    /// Creates a new address from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address has no `@`, or an
    /// empty local part or domain.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let mut addr = addr.into();
        let trimmed = addr.trim();
        if trimmed.len() != addr.len() {
            addr = trimmed.to_string();
        }

        if addr.is_empty() {
            return Err(Error::InvalidAddress("Address cannot be empty".into()));
        }

        let Some(at) = addr.find('@') else {
            return Err(Error::InvalidAddress(format!("{addr}: missing @")));
        };

        if at == 0 || at + 1 == addr.len() {
            return Err(Error::InvalidAddress(format!(
                "{addr}: local and domain parts cannot be empty"
            )));
        }

        if addr.contains(['<', '>', '\r', '\n']) {
            return Err(Error::InvalidAddress(format!(
                "{}: contains characters not allowed in an envelope path",
                addr.escape_debug()
            )));
        }

        Ok(Self { addr, at })
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.addr
    }

    /// Returns the local part (before the first `@`).
    #[must_use]
    pub fn local_part(&self) -> &str {
        &self.addr[..self.at]
    }

    /// Returns the domain (after the first `@`).
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.addr[self.at + 1..]
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.addr)
    }
}

impl std::str::FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
