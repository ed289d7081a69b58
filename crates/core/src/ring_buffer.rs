//! Fixed-capacity FIFO used by both sides of the frame adapter.
//!
//! Wraps `ringbuf::HeapRb` with all-or-nothing writes and reads so that a
//! capacity violation is reported to the caller instead of silently
//! truncating the transfer.

use crate::error::RingBufferError;
use ringbuf::traits::{Consumer, Observer, Producer};
use ringbuf::HeapRb;
use std::mem::size_of;

pub struct RingBuffer<T> {
    rb: HeapRb<T>,
}

impl<T: Copy> RingBuffer<T> {
    /// Allocates a buffer holding `capacity` elements.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            rb: HeapRb::<T>::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.rb.capacity().get()
    }

    /// Number of elements currently held.
    pub fn len(&self) -> usize {
        self.rb.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.rb.is_empty()
    }

    /// Number of elements that can be written before the buffer is full.
    pub fn free_len(&self) -> usize {
        self.rb.vacant_len()
    }

    pub fn bytes_used(&self) -> usize {
        self.len() * size_of::<T>()
    }

    pub fn free_space(&self) -> usize {
        self.free_len() * size_of::<T>()
    }

    /// Appends all of `items`, or nothing if they do not fit.
    pub fn write(&mut self, items: &[T]) -> Result<(), RingBufferError> {
        let available = self.free_len();
        if items.len() > available {
            return Err(RingBufferError::InsufficientSpace {
                requested: items.len(),
                available,
            });
        }
        let written = self.rb.push_slice(items);
        debug_assert_eq!(written, items.len());
        Ok(())
    }

    /// Fills `out` with the oldest elements, or consumes nothing if fewer
    /// than `out.len()` are held.
    pub fn read(&mut self, out: &mut [T]) -> Result<(), RingBufferError> {
        let available = self.len();
        if out.len() > available {
            return Err(RingBufferError::InsufficientData {
                requested: out.len(),
                available,
            });
        }
        let read = self.rb.pop_slice(out);
        debug_assert_eq!(read, out.len());
        Ok(())
    }
}
