//! Message payload decoding
//!
//! Payload layout: `<origin-ms>%%<text>`. The split happens at the first
//! marker; everything after it, further markers included, is text.

use bigboard_core::{BoardError, BoardResult, Timestamp};

/// Separator between the origin timestamp and the message text
pub const MESSAGE_MARKER: &[u8] = b"%%";

/// A decoded message payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Producer's claimed send time
    pub origin: Timestamp,
    /// Message text (lossy UTF-8)
    pub text: String,
}

/// Decode a raw message payload
pub fn decode_payload(payload: &[u8]) -> BoardResult<DecodedMessage> {
    let marker_pos = find_marker(payload).ok_or_else(|| {
        BoardError::MalformedPayload("missing marker".into())
    })?;

    let head = std::str::from_utf8(&payload[..marker_pos])
        .map_err(|_| BoardError::MalformedPayload("timestamp is not UTF-8".into()))?;

    let origin = Timestamp::parse_millis(head)
        .map_err(|e| BoardError::MalformedPayload(e.to_string()))?;

    let text = String::from_utf8_lossy(&payload[marker_pos + MESSAGE_MARKER.len()..]).into_owned();

    Ok(DecodedMessage { origin, text })
}

/// Encode a payload. Only producers and tests need this; the client never
/// publishes.
pub fn encode_payload(origin: Timestamp, text: &str) -> Vec<u8> {
    let mut buf = origin.as_millis().to_string().into_bytes();
    buf.extend_from_slice(MESSAGE_MARKER);
    buf.extend_from_slice(text.as_bytes());
    buf
}

fn find_marker(payload: &[u8]) -> Option<usize> {
    payload
        .windows(MESSAGE_MARKER.len())
        .position(|w| w == MESSAGE_MARKER)
}
