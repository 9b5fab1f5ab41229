//! Bounded, lock-protected FIFO of in-flight result-buffer indices.
//!
//! Grounded on `RFLock.h`'s `RFLockedQueue<T>` template: every operation
//! takes the lock, there is no lock-free fast path. Bounded at `NUM_RESULTS`
//! so `encode_frame` can fail with `QueueFull` instead of growing the queue
//! without limit.

use super::CriticalSection;
use std::collections::VecDeque;

/// Capacity shared by the result-buffer ring and its in-flight FIFO.
pub const NUM_RESULTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

/// A `VecDeque<usize>` behind a single lock, bounded at `capacity`.
pub struct BoundedFifo {
    inner: CriticalSection<VecDeque<usize>>,
    capacity: usize,
}

impl BoundedFifo {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: CriticalSection::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Pushes `index` to the back. Fails without mutating the queue if it is
    /// already at capacity.
    pub fn push(&self, index: usize) -> Result<(), QueueFull> {
        let mut guard = self.inner.lock();
        if guard.len() >= self.capacity {
            return Err(QueueFull);
        }
        guard.push_back(index);
        Ok(())
    }

    /// Pops the oldest index, if any.
    pub fn pop(&self) -> Option<usize> {
        self.inner.lock().pop_front()
    }

    /// Oldest index without removing it.
    pub fn front(&self) -> Option<usize> {
        self.inner.lock().front().copied()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }
}
