//! Recipient entry.

use std::io::{self, BufRead};

/// Reads one recipient per line until a blank line or end of input.
///
/// Surrounding whitespace is dropped. A line without `@` is taken as a local
/// part and completed with `@domain`.
pub fn read_recipients<R: BufRead>(reader: R, domain: &str) -> io::Result<Vec<String>> {
    let mut recipients = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let entry = line.trim();
        if entry.is_empty() {
            break;
        }
        recipients.push(complete(entry, domain));
    }

    Ok(recipients)
}

fn complete(entry: &str, domain: &str) -> String {
    if entry.contains('@') {
        entry.to_string()
    } else {
        format!("{entry}@{domain}")
    }
}
