//! Chunked file content stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio_stream::Stream;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::Error;

/// A finite stream of decompressed file content.
///
/// Yields chunks in order until the member is exhausted; on success the
/// concatenated chunks total exactly [`ContentStream::len`] bytes. The
/// stream is single-pass. A fresh one must be requested to re-read.
pub struct ContentStream {
    len: u64,
    chunks: ReceiverStream<Result<Bytes, Error>>,
}

impl ContentStream {
    pub(crate) fn new(len: u64, chunks: ReceiverStream<Result<Bytes, Error>>) -> Self {
        Self { len, chunks }
    }

    /// Total number of bytes the stream yields when fully consumed.
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the stream will yield no chunks.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Stream for ContentStream {
    type Item = Result<Bytes, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().chunks).poll_next(cx)
    }
}

impl std::fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStream")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}
