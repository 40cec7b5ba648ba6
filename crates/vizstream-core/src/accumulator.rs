//! Content accumulator: folds a frame sequence into one payload string.
//!
//! Only frames of the target event category (`content` by default) are kept;
//! their payloads are concatenated in arrival order. The `[DONE]` sentinel is
//! never appended, and anything after it is ignored. A fresh accumulator is
//! created per request.

use crate::types::Frame;
use futures::{Stream, StreamExt};

/// Event category carrying the model's answer.
pub const CONTENT_EVENT: &str = "content";

#[derive(Debug, Clone)]
pub struct ContentAccumulator {
    target: String,
    buffer: String,
    accepted: usize,
    done: bool,
}

impl ContentAccumulator {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            buffer: String::new(),
            accepted: 0,
            done: false,
        }
    }

    /// Accumulator for the default `content` category.
    pub fn content() -> Self {
        Self::new(CONTENT_EVENT)
    }

    /// Offer a frame. Returns `true` when its payload was appended.
    pub fn push(&mut self, frame: &Frame) -> bool {
        if self.done || !frame.is_event(&self.target) {
            return false;
        }
        if frame.is_done() {
            self.done = true;
            return false;
        }
        self.buffer.push_str(&frame.payload);
        self.accepted += 1;
        true
    }

    /// True once the target event delivered `[DONE]`.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of frames appended so far.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// The content accumulated so far.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    /// Drain a frame iterator and return the concatenated content.
    pub fn collect<I>(target: &str, frames: I) -> String
    where
        I: IntoIterator<Item = Frame>,
    {
        let mut acc = Self::new(target);
        for frame in frames {
            acc.push(&frame);
        }
        acc.finish()
    }
}

/// Drain a fallible frame stream and return the concatenated content of the
/// `target` event.
///
/// The stream is consumed until exhausted. The first transport error aborts
/// accumulation and is returned as-is.
pub async fn accumulate<S, E>(target: &str, mut frames: S) -> Result<String, E>
where
    S: Stream<Item = Result<Frame, E>> + Unpin,
{
    let mut acc = ContentAccumulator::new(target);
    while let Some(frame) = frames.next().await {
        acc.push(&frame?);
    }
    tracing::debug!(
        target_event = target,
        frames = acc.accepted(),
        bytes = acc.as_str().len(),
        done = acc.is_done(),
        "content accumulated"
    );
    Ok(acc.finish())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
