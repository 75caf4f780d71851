//! Message body encoding for the DATA phase.
//!
//! Lines are normalized to CRLF and any line starting with `.` gets one extra
//! leading `.` so it cannot be mistaken for the end-of-data terminator.

/// End-of-data terminator sent after the stuffed body.
pub const DATA_TERMINATOR: &[u8] = b".\r\n";

/// Splits a body into lines, accepting both CRLF and bare LF endings.
///
/// A trailing line ending does not produce an extra empty line. Only an
/// empty body has no lines.
fn lines(body: &[u8]) -> impl Iterator<Item = &[u8]> {
    let empty = body.is_empty();
    let body = body.strip_suffix(b"\n").unwrap_or(body);
    body.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(move |_| !empty)
}

/// Encodes a body for transmission after `DATA`.
///
/// The result is CRLF-terminated and does not include [`DATA_TERMINATOR`].
#[must_use]
pub fn dot_stuff(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + body.len() / 32 + 2);
    for line in lines(body) {
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Reverses [`dot_stuff`]: removes exactly one leading `.` from lines that
/// start with one.
#[must_use]
pub fn dot_unstuff(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for line in lines(data) {
        out.extend_from_slice(line.strip_prefix(b".").unwrap_or(line));
        out.extend_from_slice(b"\r\n");
    }
    out
}
