//! Reading complete replies off a transport.

use bytes::BytesMut;
use tracing::trace;

use super::transport::Transport;
use crate::error::Result;
use crate::parser::parse_reply;
use crate::types::Reply;

/// Size of each receive call.
const READ_CHUNK: usize = 4096;

/// Reads one complete reply.
///
/// Receives until the accumulated bytes form a reply whose final line is the
/// last line received.
///
/// # Errors
///
/// Returns [`crate::Error::MalformedReply`] for structurally invalid replies,
/// [`crate::Error::ConnectionClosed`] if the peer closes before the final
/// line, and any transport error.
pub async fn read_reply(transport: &mut Transport) -> Result<Reply> {
    let mut acc = BytesMut::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = transport.receive(&mut chunk).await?;
        acc.extend_from_slice(&chunk[..n]);

        if let Some(reply) = parse_reply(&acc)? {
            trace!(code = %reply.code(), raw = reply.raw().trim_end(), "reply");
            return Ok(reply);
        }
    }
}
