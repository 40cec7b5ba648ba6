//! Frame decoder: turns an incrementally delivered event stream into
//! [`Frame`] values.
//!
//! The wire format is newline-delimited:
//!
//! ```text
//! event: <category>
//! data: <fragment>
//! ```
//!
//! A `data:` line belongs to the most recent `event:` line. Lines matching
//! neither prefix are ignored. Network chunks carry no alignment guarantee, so
//! the decoder keeps the unterminated tail of each chunk in a carry buffer and
//! prepends it to the next one. The carry holds raw bytes: a chunk boundary
//! may split a multi-byte UTF-8 sequence, but never a `\n`, so lines are only
//! converted to text once they are complete.
//!
//! Once an event delivers the `[DONE]` sentinel, the sentinel frame itself is
//! emitted and every later `data:` line of that event is dropped.
//!
//! [`FrameDecoder`] is the synchronous core. [`FrameDecoder::frames`] wraps an
//! iterator of chunks, and [`FrameStream`] wraps an async chunk stream and
//! owns it: dropping or [closing](FrameStream::close) the stream releases the
//! transport.

use crate::types::Frame;
use futures::{ready, Stream, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::pin::Pin;
use std::task::{Context, Poll};

const EVENT_PREFIX: &str = "event: ";
const DATA_PREFIX: &str = "data: ";

// ---------------------------------------------------------------------------
// FrameDecoder
// ---------------------------------------------------------------------------

/// Incremental decoder state for one stream.
///
/// Owned by a single consuming call; never shared between streams.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    current_event: Option<String>,
    carry: Vec<u8>,
    /// Events that have already delivered the `[DONE]` sentinel.
    finished: HashSet<Option<String>>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the frames completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        let mut buf = std::mem::take(&mut self.carry);
        buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(offset) = buf[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            if let Some(frame) = self.decode_line(&buf[start..end]) {
                frames.push(frame);
            }
            start = end + 1;
        }

        buf.drain(..start);
        self.carry = buf;
        frames
    }

    /// Flush the residual carry as a final, unterminated line.
    ///
    /// Call once the transport reports end of stream.
    pub fn finish(&mut self) -> Option<Frame> {
        if self.carry.is_empty() {
            return None;
        }
        tracing::trace!(bytes = self.carry.len(), "flushing unterminated line");
        let line = std::mem::take(&mut self.carry);
        self.decode_line(&line)
    }

    /// Decode a complete stream held in memory, chunk by chunk.
    pub fn decode_all<I, B>(chunks: I) -> Vec<Frame>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self::frames(chunks.into_iter()).collect()
    }

    /// Lazily decode an iterator of chunks.
    pub fn frames<I, B>(chunks: I) -> Frames<I>
    where
        I: Iterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Frames {
            chunks: Some(chunks),
            decoder: FrameDecoder::new(),
            pending: VecDeque::new(),
        }
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<Frame> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let text = String::from_utf8_lossy(line);

        if let Some(name) = text.strip_prefix(EVENT_PREFIX) {
            self.current_event = Some(name.trim().to_string());
            return None;
        }

        let Some(payload) = text.strip_prefix(DATA_PREFIX) else {
            if !text.is_empty() {
                tracing::trace!(line = %text, "ignoring unrecognised line");
            }
            return None;
        };

        if self.finished.contains(&self.current_event) {
            return None;
        }

        let frame = Frame {
            event: self.current_event.clone(),
            payload: payload.to_string(),
        };
        if frame.is_done() {
            tracing::debug!(event = ?frame.event, "event stream signalled done");
            self.finished.insert(self.current_event.clone());
        }
        Some(frame)
    }
}

// ---------------------------------------------------------------------------
// Synchronous adapter
// ---------------------------------------------------------------------------

/// Iterator returned by [`FrameDecoder::frames`].
pub struct Frames<I> {
    chunks: Option<I>,
    decoder: FrameDecoder,
    pending: VecDeque<Frame>,
}

impl<I, B> Iterator for Frames<I>
where
    I: Iterator<Item = B>,
    B: AsRef<[u8]>,
{
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Some(frame);
            }
            let chunks = self.chunks.as_mut()?;
            match chunks.next() {
                Some(chunk) => self.pending.extend(self.decoder.push(chunk.as_ref())),
                None => {
                    self.chunks = None;
                    return self.decoder.finish();
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Async adapter
// ---------------------------------------------------------------------------

/// Async stream of frames decoded from a fallible chunk stream.
///
/// A transport error is yielded once and ends the stream; the transport is
/// dropped at that point, at end of stream, on [`close`](Self::close), or when
/// the `FrameStream` itself is dropped.
pub struct FrameStream<S> {
    inner: Option<S>,
    decoder: FrameDecoder,
    pending: VecDeque<Frame>,
}

impl<S> FrameStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Some(inner),
            decoder: FrameDecoder::new(),
            pending: VecDeque::new(),
        }
    }

    /// Release the transport and discard undelivered frames.
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            tracing::debug!(dropped = self.pending.len(), "frame stream cancelled");
        }
        self.pending.clear();
    }

    /// True while the underlying transport is still held.
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }
}

impl<S, B, E> Stream for FrameStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<Frame, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(frame) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(frame)));
            }
            let Some(inner) = this.inner.as_mut() else {
                return Poll::Ready(None);
            };
            match ready!(inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => {
                    let frames = this.decoder.push(chunk.as_ref());
                    this.pending.extend(frames);
                }
                Some(Err(err)) => {
                    this.inner = None;
                    return Poll::Ready(Some(Err(err)));
                }
                None => {
                    this.inner = None;
                    return Poll::Ready(this.decoder.finish().map(Ok));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
