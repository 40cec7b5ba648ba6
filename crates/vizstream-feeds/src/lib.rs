//! vizstream-feeds: transports that deliver event-stream chunks.
//!
//! Every transport produces a [`ChunkStream`]: an ordered, fallible stream of
//! byte chunks with no alignment to line boundaries. Wrap it in
//! [`frames`] to decode it. Dropping the resulting stream drops the
//! transport, which closes the HTTP connection or file handle.

pub mod backend;
pub mod transcript;

use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use vizstream_core::{FrameStream, TableError};

pub use backend::{HttpBackend, PlanRequest};

/// Boxed chunk stream shared by all transports.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Frames decoded from a transport.
pub type Frames = FrameStream<ChunkStream>;

/// Decode a transport's chunks into frames.
pub fn frames(chunks: ChunkStream) -> Frames {
    FrameStream::new(chunks)
}

/// Failure of a streaming or fetch call. Fatal to the request that hit it;
/// nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid request to {url}: {reason}")]
    InvalidRequest { url: String, reason: String },
    #[error("connection to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },
    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: hyper::StatusCode,
    },
    #[error("{url} returned no body")]
    NoBody { url: String },
    #[error("reading response body failed: {0}")]
    Body(#[from] hyper::Error),
    #[error("reading transcript failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Table(#[from] TableError),
}
