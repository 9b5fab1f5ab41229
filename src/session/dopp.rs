//! Desktop-capture specialization: display resolution, the
//! change-notification event loop, frame-debt tolerance, and the early
//! re-init schedule for late-stabilizing displays.

use crate::context::Context;
use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of frames considered dirty after any change notification, since
/// the display pipeline itself has latency.
const FRAME_CONTINUE_COUNT: u32 = 3;

/// Notification channel a caller can signal via `release_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    DesktopChange,
    MouseShape,
}

/// A manual-reset event backed by a condvar, used for both the driver's
/// change-notification signal and the caller-triggered release.
pub struct ManualResetEvent {
    state: Mutex<bool>,
    cond: Condvar,
}

impl ManualResetEvent {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    pub fn set(&self) {
        *self.state.lock() = true;
        self.cond.notify_all();
    }

    pub fn reset(&self) {
        *self.state.lock() = false;
    }

    /// Blocks until set, then returns without resetting.
    pub fn wait(&self) {
        let mut guard = self.state.lock();
        while !*guard {
            self.cond.wait(&mut guard);
        }
    }

    /// Blocks on whichever of `self`/`other` is set first; returns `0` if it
    /// was `self`, `1` if it was `other`. Mirrors the two-event wait used by
    /// "block until change" (event 0 = desktop change, event 1 = release).
    pub fn wait_either(&self, other: &ManualResetEvent) -> u32 {
        loop {
            if *self.state.lock() {
                return 0;
            }
            if *other.state.lock() {
                return 1;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Default for ManualResetEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves exactly one desktop identifier to a physical display: exactly
/// one of the vendor/platform/internal display properties must be set.
#[derive(Debug, Clone, Copy)]
pub enum DesktopIdentifier {
    Vendor(u32),
    PlatformDisplay(u32),
    Internal(u32),
}

/// Driver adapter bound to one display's bus, mocked behind a trait like
/// [`crate::context::backend::InteropBackend`] and
/// [`super::mouse::MouseShapeSource`], since the real desktop-duplication
/// extension needs a vendor driver this crate cannot assume is present.
pub trait DisplayAdapter: Send {
    /// Captures the current desktop frame into one of `N` rotating
    /// framebuffer textures and returns which slot was written.
    fn capture_frame(&mut self, context: &Context) -> Result<Arc<wgpu::Texture>>;
    /// Recreates the capture target at the given size; called after
    /// `init` and after every resize.
    fn resize_target(&mut self, width: u32, height: u32) -> Result<()>;
    /// The driver-owned kernel event signaling a desktop update, if this
    /// adapter supports blocking/polling for change (always `Some` here
    /// since the adapter is the sole source of the desktop-change signal).
    fn change_event(&self) -> Arc<ManualResetEvent>;
    fn framebuffer_count(&self) -> usize;
    fn framebuffer(&self, idx: usize) -> Arc<wgpu::Texture>;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMode {
    /// `preprocess_frame` never waits; a background thread sets an atomic
    /// flag whenever the desktop updates.
    UpdateOnChange,
    /// `preprocess_frame` itself blocks on a two-event wait.
    BlockUntilChange,
    /// Neither flag was set: capture unconditionally every call.
    Polling,
}

/// Tracks the re-init schedule: up to five `resize_target` calls within
/// the first ~5 seconds after `init`/`resize`, to work around displays
/// that stabilize late.
struct ReinitSchedule {
    start: Instant,
    remaining: u32,
    next_due: Duration,
}

const REINIT_ATTEMPTS: u32 = 5;
const REINIT_WINDOW: Duration = Duration::from_secs(5);

impl ReinitSchedule {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            remaining: REINIT_ATTEMPTS,
            next_due: REINIT_WINDOW / REINIT_ATTEMPTS as u32,
        }
    }

    /// Returns true (and advances the schedule) if a re-init is due now.
    fn poll(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        if self.start.elapsed() < self.next_due {
            return false;
        }
        self.remaining -= 1;
        self.next_due += REINIT_WINDOW / REINIT_ATTEMPTS as u32;
        true
    }
}

/// Factory resolving one [`DesktopIdentifier`] to a driver adapter plus an
/// optional mouse-shape source. Installed once by a host that has the
/// vendor display-enumeration library available; see
/// [`crate::encoder::amf::install_vendor_factory`] for the identical
/// pattern used by the AMF encoder.
pub type AdapterFactory =
    fn(DesktopIdentifier, bool) -> Result<(Box<dyn DisplayAdapter>, Option<Box<dyn super::mouse::MouseShapeSource>>)>;

static ADAPTER_FACTORY: once_cell::sync::OnceCell<AdapterFactory> = once_cell::sync::OnceCell::new();

pub fn install_adapter_factory(factory: AdapterFactory) -> Result<()> {
    ADAPTER_FACTORY.set(factory).map_err(|_| Error::InvalidConfig)
}

pub fn create_adapter(
    id: DesktopIdentifier,
    want_mouse: bool,
) -> Result<(Box<dyn DisplayAdapter>, Option<Box<dyn super::mouse::MouseShapeSource>>)> {
    let factory = ADAPTER_FACTORY
        .get()
        .ok_or_else(|| Error::DoppFail("no display adapter factory installed".into()))?;
    factory(id, want_mouse)
}

pub enum PreprocessResult {
    /// RT slot index the pipeline should encode from.
    Idx(usize),
    /// No new frame; caller decides whether that's fatal based on FIFO state.
    NoUpdate,
}

/// Desktop-capture specialization of [`super::Session`]'s source. Owns the
/// driver adapter, the optional mouse-shape source, and the
/// change-notification bookkeeping.
pub struct DesktopCapture {
    adapter: Box<dyn DisplayAdapter>,
    mode: ChangeMode,
    changed: Arc<AtomicBool>,
    release_event: Arc<ManualResetEvent>,
    notifier: Option<std::thread::JoinHandle<()>>,
    notifier_stop: Arc<AtomicBool>,
    frame_debt: u32,
    rt_indices: Vec<usize>,
    next_rt: usize,
    reinit: ReinitSchedule,
}

impl DesktopCapture {
    pub fn new(mut adapter: Box<dyn DisplayAdapter>, mode: ChangeMode) -> Result<Self> {
        adapter.resize_target(adapter.width(), adapter.height())?;
        let changed = Arc::new(AtomicBool::new(true));
        let notifier_stop = Arc::new(AtomicBool::new(false));
        let notifier = if mode == ChangeMode::UpdateOnChange {
            let event = adapter.change_event();
            let changed = changed.clone();
            let stop = notifier_stop.clone();
            Some(std::thread::spawn(move || {
                while !stop.load(Ordering::Acquire) {
                    event.wait();
                    changed.store(true, Ordering::Release);
                    event.reset();
                }
            }))
        } else {
            None
        };
        Ok(Self {
            adapter,
            mode,
            changed,
            release_event: Arc::new(ManualResetEvent::new()),
            notifier,
            notifier_stop,
            frame_debt: 0,
            rt_indices: Vec::new(),
            next_rt: 0,
            reinit: ReinitSchedule::new(),
        })
    }

    /// Registers the adapter's rotating framebuffer textures as input
    /// images, replacing any previous registration (called from
    /// `finalize_context` and after `resize_resources`).
    /// The display's native capture resolution, for sizing the encoder.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.adapter.width(), self.adapter.height())
    }

    pub fn register_framebuffers(&mut self, context: &Context) -> Result<()> {
        self.rt_indices.clear();
        for i in 0..self.adapter.framebuffer_count() {
            let texture = self.adapter.framebuffer(i);
            let idx = context.register_owned_image(texture, self.adapter.width(), self.adapter.height())?;
            self.rt_indices.push(idx);
        }
        self.next_rt = 0;
        Ok(())
    }

    fn run_reinit_if_due(&mut self) {
        if self.reinit.poll() {
            if let Err(err) = self.adapter.resize_target(self.adapter.width(), self.adapter.height()) {
                log::warn!("desktop capture re-init failed: {err}");
            }
        }
    }

    pub fn preprocess_frame(&mut self) -> Result<PreprocessResult> {
        self.run_reinit_if_due();

        let has_update = match self.mode {
            ChangeMode::Polling => true,
            ChangeMode::UpdateOnChange => self.changed.swap(false, Ordering::AcqRel),
            ChangeMode::BlockUntilChange => {
                if self.frame_debt > 0 {
                    true
                } else {
                    let event = self.adapter.change_event();
                    let which = event.wait_either(&self.release_event);
                    if which == 1 {
                        self.release_event.reset();
                        false
                    } else {
                        event.reset();
                        true
                    }
                }
            }
        };

        if has_update {
            self.frame_debt = FRAME_CONTINUE_COUNT;
        } else if self.frame_debt == 0 {
            return Ok(PreprocessResult::NoUpdate);
        }
        self.frame_debt = self.frame_debt.saturating_sub(1);

        if self.rt_indices.is_empty() {
            return Err(Error::DoppFail("framebuffers not registered".into()));
        }
        let slot = self.next_rt;
        self.next_rt = (self.next_rt + 1) % self.rt_indices.len();
        Ok(PreprocessResult::Idx(self.rt_indices[slot]))
    }

    pub fn resize(&mut self, context: &Context, width: u32, height: u32) -> Result<()> {
        self.adapter.resize_target(width, height)?;
        self.reinit = ReinitSchedule::new();
        self.register_framebuffers(context)
    }

    pub fn release_event(&self, kind: NotificationKind) {
        if kind == NotificationKind::DesktopChange {
            self.release_event.set();
        }
    }
}

impl Drop for DesktopCapture {
    fn drop(&mut self) {
        self.notifier_stop.store(true, Ordering::Release);
        self.adapter.change_event().set();
        if let Some(handle) = self.notifier.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinit_schedule_fires_five_times_then_stops() {
        let mut schedule = ReinitSchedule {
            start: Instant::now() - REINIT_WINDOW,
            remaining: REINIT_ATTEMPTS,
            next_due: Duration::from_secs(0),
        };
        let mut fired = 0;
        for _ in 0..10 {
            if schedule.poll() {
                fired += 1;
            }
            schedule.next_due = Duration::from_secs(0);
        }
        assert_eq!(fired, REINIT_ATTEMPTS);
    }

    #[test]
    fn manual_reset_event_wait_either_prefers_self() {
        let a = ManualResetEvent::new();
        let b = ManualResetEvent::new();
        a.set();
        assert_eq!(a.wait_either(&b), 0);
    }
}
