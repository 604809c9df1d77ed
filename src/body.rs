//! Response bodies produced by applications.
//!
//! A body is a finite, consume-once sequence of byte chunks. The exchange
//! drains it after the application returns and calls `close` exactly once,
//! whether or not draining finished cleanly.

use std::collections::VecDeque;

use bytes::Bytes;

use crate::error::BoxError;

/// A finite sequence of response body chunks.
pub trait Body {
    /// The next chunk, or `None` once the body is exhausted. Empty chunks
    /// are allowed; the exchange skips them without touching the wire.
    fn next_chunk(&mut self) -> Result<Option<Bytes>, BoxError>;

    /// Release whatever the body holds open. The default does nothing.
    fn close(&mut self) {}
}

/// Eager in-memory body backed by a list of chunks.
pub struct Chunks {
    chunks: VecDeque<Bytes>,
}

impl Chunks {
    /// A body with no chunks at all. The exchange still forces the header
    /// section onto the wire for such responses.
    pub fn empty() -> Self {
        Chunks {
            chunks: VecDeque::new(),
        }
    }

    /// A single-chunk body.
    pub fn one(data: impl Into<Bytes>) -> Self {
        Chunks {
            chunks: VecDeque::from([data.into()]),
        }
    }
}

impl From<Vec<Bytes>> for Chunks {
    fn from(chunks: Vec<Bytes>) -> Self {
        Chunks {
            chunks: chunks.into(),
        }
    }
}

impl Body for Chunks {
    fn next_chunk(&mut self) -> Result<Option<Bytes>, BoxError> {
        Ok(self.chunks.pop_front())
    }
}
