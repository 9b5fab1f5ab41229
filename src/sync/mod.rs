//! Single-writer critical sections, a bounded lock-protected FIFO, and a
//! GPU-event wrapper with exactly-once release.
//!
//! Grounded on `RFLock.h`'s `RFLock`/`RFReadWriteAccess`/`RFLockedQueue`
//! trio: a critical section, an RAII guard, and a queue that takes the lock
//! for every operation. `parking_lot::Mutex` stands in for the Win32
//! `CRITICAL_SECTION` (same non-reentrant, OS-futex-backed semantics);
//! `parking_lot` is already part of this corpus's stack (`wgpu-hal`).

mod event;
mod fifo;

pub use event::GpuEvent;
pub use fifo::{BoundedFifo, NUM_RESULTS, QueueFull};

use parking_lot::Mutex;

/// A single named critical section. Thin wrapper kept distinct from a bare
/// `Mutex` so call sites name what they guard: "session lock", "global
/// session lock", etc.
#[derive(Default)]
pub struct CriticalSection<T> {
    inner: Mutex<T>,
}

impl<T> CriticalSection<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, T> {
        self.inner.lock()
    }
}
