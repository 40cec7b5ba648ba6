//! Event-stream encoder: the producer side of the wire format that
//! [`decoder`](crate::decoder) consumes.
//!
//! Each record is an `event:` line followed by one `data:` line per payload
//! line and a blank separator line. The decoder ignores the separator. A
//! payload containing newlines becomes several `data:` lines of the same
//! event; the decoder concatenates them without the newlines.

use crate::types::DONE_SENTINEL;
use std::fmt::Write as _;

/// Encode one event record.
pub fn encode_event(event: &str, payload: &str) -> String {
    let mut out = String::with_capacity(event.len() + payload.len() + 18);
    let _ = writeln!(out, "event: {event}");
    for line in payload.split('\n') {
        let _ = writeln!(out, "data: {line}");
    }
    out.push('\n');
    out
}

/// Encode the `[DONE]` record for `event`.
pub fn encode_done(event: &str) -> String {
    encode_event(event, DONE_SENTINEL)
}

/// Encode `payload` as consecutive `event` records of at most
/// `fragment_chars` characters each, the way a backend streams its answer a
/// few tokens at a time.
pub fn encode_fragmented(event: &str, payload: &str, fragment_chars: usize) -> String {
    let chars: Vec<char> = payload.chars().collect();
    chars
        .chunks(fragment_chars.max(1))
        .map(|piece| encode_event(event, &piece.iter().collect::<String>()))
        .collect()
}
