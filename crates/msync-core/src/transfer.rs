//! Growable accumulator for response bodies of unknown length.
//!
//! The buffer starts at one page, asks its source for at most the free tail,
//! and grows by one page whenever the source reports more data pending. The
//! advisory `Content-Length` is never consulted: chunked responses omit it and
//! servers get it wrong.

use crate::error::SyncError;

/// Initial capacity of a fresh buffer.
pub const INITIAL_CAPACITY: usize = 4096;

/// Bytes added on each growth step.
pub const GROWTH_INCREMENT: usize = 4096;

/// What a body source reports after one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// `n` bytes were written to the destination and more data may follow.
    Pending(usize),
    /// `n` bytes were written to the destination and the body is complete.
    Complete(usize),
}

/// A response body that can be pulled into caller-provided memory.
pub trait BodySource {
    /// Copy up to `dst.len()` bytes into `dst`.
    ///
    /// Returning `Pending(0)` with a non-empty `dst` is allowed (nothing arrived
    /// yet); the caller simply asks again.
    fn read_into(&mut self, dst: &mut [u8]) -> Result<ReadStatus, SyncError>;
}

impl<S: BodySource + ?Sized> BodySource for &mut S {
    fn read_into(&mut self, dst: &mut [u8]) -> Result<ReadStatus, SyncError> {
        (**self).read_into(dst)
    }
}

/// Owned byte region with tracked `capacity` and `used` (`used <= capacity`).
#[derive(Debug)]
pub struct TransferBuffer {
    data: Vec<u8>,
    used: usize,
}

impl Default for TransferBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferBuffer {
    pub fn new() -> Self {
        Self {
            data: vec![0; INITIAL_CAPACITY],
            used: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes received so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.used]
    }

    /// Make room for one more increment past `used`.
    ///
    /// The reservation is attempted before the region is touched, so on failure
    /// the previously received bytes are still owned and intact.
    fn grow(&mut self) -> Result<(), SyncError> {
        let target = self
            .used
            .checked_add(GROWTH_INCREMENT)
            .ok_or(SyncError::Allocation { requested: usize::MAX })?;
        if target <= self.data.len() {
            return Ok(());
        }
        self.data
            .try_reserve_exact(target - self.data.len())
            .map_err(|_| SyncError::Allocation { requested: target })?;
        self.data.resize(target, 0);
        Ok(())
    }

    /// Pull the whole body out of `source`.
    ///
    /// On error the buffer is dropped with the caller's `Result`; nothing
    /// partial escapes.
    pub fn fill_from<S: BodySource + ?Sized>(&mut self, source: &mut S) -> Result<(), SyncError> {
        loop {
            let tail = &mut self.data[self.used..];
            let status = source.read_into(tail)?;
            let (n, done) = match status {
                ReadStatus::Pending(n) => (n, false),
                ReadStatus::Complete(n) => (n, true),
            };
            debug_assert!(n <= tail.len(), "source overran the free tail");
            self.used += n.min(tail.len());
            if done {
                return Ok(());
            }
            if self.used == self.data.len() {
                self.grow()?;
            }
        }
    }

    /// Trim to exactly `used` bytes and hand the region over.
    ///
    /// An empty body yields an empty vector; that is a successful download, not
    /// an allocation failure.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.data.truncate(self.used);
        self.data.shrink_to_fit();
        self.data
    }
}

/// Convenience: accumulate a full body from `source`.
pub fn read_body<S: BodySource + ?Sized>(source: &mut S) -> Result<Vec<u8>, SyncError> {
    let mut buf = TransferBuffer::new();
    buf.fill_from(source)?;
    tracing::debug!(bytes = buf.used(), capacity = buf.capacity(), "body complete");
    Ok(buf.into_bytes())
}
