//! Recorded event streams: files, stdin, and in-memory chunk lists.
//!
//! A transcript is the raw wire text a backend produced, saved to disk. It is
//! replayed in fixed-size reads, so chunk boundaries fall wherever the read
//! buffer ends, exactly as with a network body.

use crate::{ChunkStream, TransportError};
use bytes::Bytes;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// Read size used when replaying transcripts.
pub const DEFAULT_READ_SIZE: usize = 4096;

/// Stream the contents of a transcript file.
pub async fn open(path: impl AsRef<Path>) -> Result<ChunkStream, TransportError> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path).await?;
    tracing::debug!(path = %path.display(), "replaying transcript");
    Ok(from_reader(file, DEFAULT_READ_SIZE))
}

/// Stream standard input.
pub fn stdin() -> ChunkStream {
    from_reader(tokio::io::stdin(), DEFAULT_READ_SIZE)
}

/// Stream any async reader in reads of at most `read_size` bytes.
pub fn from_reader<R>(reader: R, read_size: usize) -> ChunkStream
where
    R: AsyncRead + Send + 'static,
{
    let stream = ReaderStream::with_capacity(reader, read_size.max(1))
        .map(|chunk| chunk.map_err(TransportError::from));
    Box::pin(stream)
}

/// Replay an in-memory list of chunks.
pub fn from_chunks<I, B>(chunks: I) -> ChunkStream
where
    I: IntoIterator<Item = B>,
    B: Into<Bytes>,
{
    let chunks: Vec<Result<Bytes, TransportError>> =
        chunks.into_iter().map(|c| Ok(c.into())).collect();
    Box::pin(futures::stream::iter(chunks))
}
