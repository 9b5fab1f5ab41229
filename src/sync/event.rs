//! One-shot GPU event with exactly-once release.
//!
//! Events are modeled as linear resources: a "released" bit, released on `wait`, on explicit
//! `release`, or at drop (with a warning if it was never released). This
//! wraps a `wgpu::SubmissionIndex` (the closest thing `wgpu` has to an
//! OpenCL `cl_event`): "wait" polls the device until that submission has
//! retired, "release" just drops the bookkeeping without blocking.

use std::sync::Arc;

/// A single-fire GPU completion signal. Two events chain naturally: a
/// DMA-done event can be constructed to depend on a kernel-done event by
/// simply being enqueued after it on the same queue, which is what
/// `wgpu::Queue::submit` ordering already guarantees -- there is no
/// separate wait-list API to model.
/// The released-once linear-resource bookkeeping, split out from the device
/// handle so the invariant itself is testable without a live `wgpu::Device`.
struct ReleaseState {
    released: bool,
    label: &'static str,
}

impl ReleaseState {
    fn new(label: &'static str) -> Self {
        Self { released: false, label }
    }

    fn release(&mut self) {
        self.released = true;
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for ReleaseState {
    fn drop(&mut self) {
        if !self.released {
            log::warn!("GpuEvent '{}' dropped without being released", self.label);
        }
    }
}

pub struct GpuEvent {
    device: Arc<wgpu::Device>,
    submission: Option<wgpu::SubmissionIndex>,
    state: ReleaseState,
}

impl GpuEvent {
    pub fn new(device: Arc<wgpu::Device>, label: &'static str, submission: wgpu::SubmissionIndex) -> Self {
        Self {
            device,
            submission: Some(submission),
            state: ReleaseState::new(label),
        }
    }

    /// An already-signaled event, for the "no DMA copy was issued" case:
    /// kernel/DMA events are both null when async copy is disabled.
    pub fn signaled(device: Arc<wgpu::Device>, label: &'static str) -> Self {
        Self {
            device,
            submission: None,
            state: ReleaseState::new(label),
        }
    }

    /// Blocks the calling thread until the submission has retired, then
    /// releases the event. No-op (returns immediately) if already signaled
    /// or already released.
    pub fn wait(&mut self) {
        if self.state.is_released() {
            return;
        }
        if let Some(submission) = self.submission.take() {
            let _ = self
                .device
                .poll(wgpu::PollType::WaitForSubmissionIndex(submission));
        }
        self.state.release();
    }

    /// Releases the event's bookkeeping without waiting for completion.
    /// Used when a later event on the same queue is already known to
    /// depend on this one (e.g. releasing kernel-done once DMA-done is
    /// enqueued after it).
    pub fn release(&mut self) {
        self.state.release();
        self.submission = None;
    }

    pub fn is_released(&self) -> bool {
        self.state.is_released()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_then_release_is_idempotent() {
        let mut s = ReleaseState::new("test");
        s.release();
        s.release();
        assert!(s.is_released());
    }

    #[test]
    fn release_without_wait_marks_released() {
        let mut s = ReleaseState::new("test");
        assert!(!s.is_released());
        s.release();
        assert!(s.is_released());
    }

    #[test]
    fn dropping_without_release_warns_but_does_not_panic() {
        drop(ReleaseState::new("test"));
    }
}
