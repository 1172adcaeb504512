//! Allocation arenas for band buffers
//!
//! Every [`BandBuffer`] remembers the arena that produced it and hands its
//! memory back to that same arena when released. The read path allocates from
//! the codec arena; buffers the caller builds from its own vectors belong to the
//! caller arena. Each arena keeps live counters so leaks show up in tests and
//! logs.

use std::sync::atomic::{AtomicUsize, Ordering};

use lazy_static::lazy_static;
use log::{debug, trace};

use crate::buffer::{BandBuffer, Element};
use crate::errors::{RasterError, RasterResult};

lazy_static! {
    static ref CODEC_ARENA: Arena = Arena::new("codec");
    static ref CALLER_ARENA: Arena = Arena::new("caller");
}

/// Arena used by the read path
pub fn codec_arena() -> &'static Arena {
    &CODEC_ARENA
}

/// Arena owning buffers adopted from caller vectors
pub fn caller_arena() -> &'static Arena {
    &CALLER_ARENA
}

/// Allocation bookkeeping for one family of buffers
#[derive(Debug)]
pub struct Arena {
    name: &'static str,
    live_buffers: AtomicUsize,
    live_bytes: AtomicUsize,
    total_allocations: AtomicUsize,
}

impl Arena {
    pub fn new(name: &'static str) -> Self {
        Arena {
            name,
            live_buffers: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
            total_allocations: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Allocates a zero-filled buffer of `len` elements
    ///
    /// Uses fallible reservation, so an oversized request is reported as
    /// [`RasterError::AllocationFailed`] instead of aborting the process.
    pub fn allocate<T: Element>(&'static self, len: usize) -> RasterResult<BandBuffer<T>> {
        let bytes = len.checked_mul(T::SIZE).ok_or(RasterError::AllocationFailed(usize::MAX))?;

        let mut data: Vec<T> = Vec::new();
        data.try_reserve_exact(len).map_err(|_| RasterError::AllocationFailed(bytes))?;
        data.resize(len, T::default());

        debug!("Arena '{}' allocated {} elements ({} bytes)", self.name, len, bytes);
        self.track(bytes);
        Ok(BandBuffer::from_arena(data, self))
    }

    /// Takes ownership of an existing vector
    pub fn adopt<T: Element>(&'static self, data: Vec<T>) -> BandBuffer<T> {
        let bytes = data.len() * T::SIZE;
        trace!("Arena '{}' adopted {} bytes", self.name, bytes);
        self.track(bytes);
        BandBuffer::from_arena(data, self)
    }

    fn track(&self, bytes: usize) {
        self.live_buffers.fetch_add(1, Ordering::SeqCst);
        self.live_bytes.fetch_add(bytes, Ordering::SeqCst);
        self.total_allocations.fetch_add(1, Ordering::SeqCst);
    }

    /// Records the release of a buffer of `bytes` bytes
    pub(crate) fn release(&self, bytes: usize) {
        trace!("Arena '{}' released {} bytes", self.name, bytes);
        self.live_buffers.fetch_sub(1, Ordering::SeqCst);
        self.live_bytes.fetch_sub(bytes, Ordering::SeqCst);
    }

    /// Number of buffers currently owned by callers
    pub fn live_buffers(&self) -> usize {
        self.live_buffers.load(Ordering::SeqCst)
    }

    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::SeqCst)
    }

    pub fn total_allocations(&self) -> usize {
        self.total_allocations.load(Ordering::SeqCst)
    }

    /// Whether `other` is this very arena
    pub fn same_as(&self, other: &Arena) -> bool {
        std::ptr::eq(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_arena() -> &'static Arena {
        Box::leak(Box::new(Arena::new("test")))
    }

    #[test]
    fn test_allocation_and_drop_balance_the_counters() {
        let arena = test_arena();
        let buffer = arena.allocate::<u16>(12).unwrap();
        assert_eq!(buffer.len(), 12);
        assert_eq!(arena.live_buffers(), 1);
        assert_eq!(arena.live_bytes(), 24);

        drop(buffer);
        assert_eq!(arena.live_buffers(), 0);
        assert_eq!(arena.live_bytes(), 0);
        assert_eq!(arena.total_allocations(), 1);
    }

    #[test]
    fn test_buffers_remember_their_arena() {
        let arena = test_arena();
        let buffer = arena.adopt(vec![1.0f32, 2.0]);
        assert!(buffer.arena().same_as(arena));
        assert!(!buffer.arena().same_as(codec_arena()));
    }

    #[test]
    fn test_oversized_request_fails_gracefully() {
        let arena = test_arena();
        let result = arena.allocate::<f64>(usize::MAX / 4);
        assert!(matches!(result, Err(RasterError::AllocationFailed(_))));
        assert_eq!(arena.live_buffers(), 0);
    }
}
