//! Adapts chunked byte sources to the buffer's backfill contract.
//!
//! A [`StreamReader`] wraps any blocking [`std::io::Read`] — a file, a
//! socket, a framed channel — and feeds a [`MemoryBuffer`](crate::MemoryBuffer)
//! on demand. Each fill request performs at least one pull sized to the
//! buffer's spare capacity, then loops with blocking reads until the minimum
//! demand is satisfied. Exhaustion during a required fill is a
//! **truncated-input** error, never a short result.
//!
//! Any byte returned past the initially buffered region is sourced from the
//! upstream at most once; consumed bytes stay buffered until
//! [`MemoryBuffer::shrink`](crate::MemoryBuffer::shrink) releases them.

use std::io::{ErrorKind, Read};

use crate::buffer::grow_target;
use crate::error::{PolycodeError, Result};

/// Default pull granularity when the caller does not override it.
const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Wraps an external chunked byte source for on-demand buffer backfill.
pub struct StreamReader {
    source: Box<dyn Read>,
    chunk_size: usize,
}

impl std::fmt::Debug for StreamReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamReader")
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl StreamReader {
    /// Wraps a blocking byte source with the default pull granularity.
    pub fn new<R: Read + 'static>(source: R) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK_SIZE)
    }

    /// Wraps a blocking byte source with an explicit pull granularity.
    pub fn with_chunk_size<R: Read + 'static>(source: R, chunk_size: usize) -> Self {
        Self {
            source: Box::new(source),
            chunk_size: chunk_size.max(1),
        }
    }

    /// The configured pull granularity.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Appends at least `min` bytes from the upstream at `data`'s write
    /// watermark, growing `data` by the shared capacity policy first.
    ///
    /// Reads opportunistically up to the spare capacity, so a single fill
    /// may buffer more than `min`; surplus bytes are served to later reads
    /// without touching the upstream again.
    ///
    /// # Errors
    /// [`PolycodeError::Truncated`] if the source is exhausted before `min`
    /// bytes arrive; [`PolycodeError::Io`] for transport failures.
    pub fn fill(&mut self, data: &mut Vec<u8>, min: usize) -> Result<()> {
        let start = data.len();
        let required = start + min;
        if required > data.capacity() {
            data.reserve_exact(grow_target(required) - start);
        }

        let want = (data.capacity() - start).max(min).max(self.chunk_size);
        data.resize(start + want, 0);

        let mut filled = 0usize;
        while filled < min {
            match self.source.read(&mut data[start + filled..]) {
                Ok(0) => {
                    data.truncate(start + filled);
                    return Err(PolycodeError::Truncated(format!(
                        "Stream exhausted: needed {min} bytes, got {filled}"
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    data.truncate(start + filled);
                    return Err(e.into());
                }
            }
        }
        data.truncate(start + filled);
        Ok(())
    }
}
