//! Arena-tagged band buffers and buffer collections

use std::fmt;
use std::ops::{Deref, DerefMut};

use log::debug;

use crate::buffer::Element;
use crate::codec::arena::{caller_arena, Arena};

/// One band of pixel data, row-major, `width * height` elements
///
/// The buffer records the arena that produced it and returns its memory to that
/// arena when released, either through [`BandBuffers::cleanup`] or on drop.
pub struct BandBuffer<T: Element> {
    data: Vec<T>,
    bytes: usize,
    arena: &'static Arena,
}

impl<T: Element> BandBuffer<T> {
    pub(crate) fn from_arena(data: Vec<T>, arena: &'static Arena) -> Self {
        let bytes = data.len() * T::SIZE;
        BandBuffer { data, bytes, arena }
    }

    /// Wraps a caller-owned vector; the buffer belongs to the caller arena
    pub fn from_vec(data: Vec<T>) -> Self {
        caller_arena().adopt(data)
    }

    /// Arena this buffer must be released through
    pub fn arena(&self) -> &'static Arena {
        self.arena
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Returns one row of a buffer that is `width` elements wide
    pub fn row(&self, row: usize, width: usize) -> &[T] {
        &self.data[row * width..(row + 1) * width]
    }

    /// Releases the buffer through its arena
    pub fn release(self) {
        drop(self)
    }

    /// Detaches the data from the arena and hands it to the caller
    pub fn into_vec(mut self) -> Vec<T> {
        let data = std::mem::take(&mut self.data);
        self.arena.release(self.bytes);
        self.bytes = 0;
        std::mem::forget(self);
        data
    }
}

impl<T: Element> Drop for BandBuffer<T> {
    fn drop(&mut self) {
        self.arena.release(self.bytes);
    }
}

impl<T: Element> Deref for BandBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T: Element> DerefMut for BandBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Element> fmt::Debug for BandBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BandBuffer")
            .field("element", &T::ELEMENT_TYPE)
            .field("len", &self.data.len())
            .field("arena", &self.arena.name())
            .finish()
    }
}

/// Ordered collection of band buffers, one slot per band
///
/// A released slot stays in place as `None`, so band indices never shift and
/// repeated cleanup is a no-op.
#[derive(Debug)]
pub struct BandBuffers<T: Element> {
    slots: Vec<Option<BandBuffer<T>>>,
}

impl<T: Element> BandBuffers<T> {
    pub fn new() -> Self {
        BandBuffers { slots: Vec::new() }
    }

    pub fn with_capacity(bands: usize) -> Self {
        BandBuffers { slots: Vec::with_capacity(bands) }
    }

    /// Builds a collection from caller vectors, one per band
    pub fn from_vecs(bands: Vec<Vec<T>>) -> Self {
        BandBuffers {
            slots: bands.into_iter().map(|data| Some(BandBuffer::from_vec(data))).collect(),
        }
    }

    pub fn push(&mut self, buffer: BandBuffer<T>) {
        self.slots.push(Some(buffer));
    }

    /// Number of slots, released or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Buffer of the 0-based band `index`, if present and not released
    pub fn band(&self, index: usize) -> Option<&BandBuffer<T>> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn band_mut(&mut self, index: usize) -> Option<&mut BandBuffer<T>> {
        self.slots.get_mut(index).and_then(|slot| slot.as_mut())
    }

    pub fn slots(&self) -> &[Option<BandBuffer<T>>] {
        &self.slots
    }

    /// Takes the buffer out of a slot, leaving the slot empty
    pub fn take(&mut self, index: usize) -> Option<BandBuffer<T>> {
        self.slots.get_mut(index).and_then(|slot| slot.take())
    }

    /// Whether every slot has been released
    pub fn is_released(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Releases every owned buffer through its arena and empties its slot
    ///
    /// Returns how many buffers were released by this call; a second call on
    /// the same collection returns 0.
    pub fn cleanup(&mut self) -> usize {
        let mut released = 0;
        for slot in self.slots.iter_mut() {
            if let Some(buffer) = slot.take() {
                buffer.release();
                released += 1;
            }
        }
        debug!("Released {} band buffers", released);
        released
    }
}

impl<T: Element> Default for BandBuffers<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::arena::Arena;

    #[test]
    fn test_cleanup_is_idempotent() {
        let arena: &'static Arena = Box::leak(Box::new(Arena::new("cleanup-test")));
        let mut buffers = BandBuffers::new();
        buffers.push(arena.allocate::<u8>(12).unwrap());
        buffers.push(arena.allocate::<u8>(12).unwrap());
        assert_eq!(arena.live_buffers(), 2);

        assert_eq!(buffers.cleanup(), 2);
        assert!(buffers.is_released());
        assert_eq!(buffers.len(), 2);
        assert_eq!(arena.live_buffers(), 0);

        assert_eq!(buffers.cleanup(), 0);
        assert_eq!(arena.live_bytes(), 0);
    }

    #[test]
    fn test_into_vec_detaches_from_the_arena() {
        let arena: &'static Arena = Box::leak(Box::new(Arena::new("detach-test")));
        let buffer = arena.adopt(vec![3i16, 4, 5]);
        let data = buffer.into_vec();
        assert_eq!(data, vec![3, 4, 5]);
        assert_eq!(arena.live_buffers(), 0);
        assert_eq!(arena.live_bytes(), 0);
    }

    #[test]
    fn test_rows_index_into_the_band() {
        let buffer = BandBuffer::from_vec((0u8..12).collect());
        assert_eq!(buffer.row(1, 4), &[4, 5, 6, 7]);
        assert_eq!(buffer[11], 11);
    }

    #[test]
    fn test_released_slots_keep_band_positions() {
        let mut buffers = BandBuffers::from_vecs(vec![vec![1u8], vec![2u8]]);
        let first = buffers.take(0);
        assert!(first.is_some());
        assert!(buffers.band(0).is_none());
        assert_eq!(buffers.band(1).map(|b| b[0]), Some(2));
    }
}
