//! Mouse-shape payloads and the platform mouse-shape query adapter.
//! Grounded on `RapidFire.h`'s `RFMouseData`/`RFMouseData2`.

use crate::error::{Error, Result};

/// `RFBitmapBuffer` equivalent: one bitmap plane of a cursor shape.
#[derive(Debug, Clone, Default)]
pub struct BitmapBuffer {
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub bits_per_pixel: u32,
    pub pixels: Vec<u8>,
}

/// v1 mouse-shape payload: separate AND-mask and color bitmaps.
#[derive(Debug, Clone, Default)]
pub struct MouseData {
    pub visible: bool,
    pub hot_x: u32,
    pub hot_y: u32,
    pub mask: BitmapBuffer,
    pub color: BitmapBuffer,
}

bitflags::bitflags! {
    /// Flag combination carried by the v2 payload's `uiFlags` field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShapeFlags: u32 {
        const MONOCHROME = 1;
        const COLOR = 2;
        const MASKED_COLOR = 4;
    }
}

/// v2 mouse-shape payload: single shape buffer compatible with the
/// platform set-pointer-shape ABI.
#[derive(Debug, Clone, Default)]
pub struct MouseData2 {
    pub visible: bool,
    pub hot_x: u32,
    pub hot_y: u32,
    pub flags: u32,
    pub shape: BitmapBuffer,
}

impl MouseData2 {
    /// Classifies `flags`, defaulting an unrecognized combination to
    /// "color with alpha" rather than rejecting it.
    pub fn shape_flags(&self) -> ShapeFlags {
        ShapeFlags::from_bits(self.flags).unwrap_or(ShapeFlags::COLOR)
    }
}

/// Platform adapter querying the OS cursor shape, mocked here the same way
/// [`crate::context::backend::InteropBackend`] mocks the zero-copy
/// interop path, since a real implementation needs OS cursor APIs this
/// crate cannot assume are present in a generic build.
pub trait MouseShapeSource: Send {
    /// Blocks until the shape changes if `wait_for_change`, otherwise
    /// returns the latest known shape immediately.
    fn query(&mut self, wait_for_change: bool) -> Result<MouseData>;
    fn query2(&mut self, wait_for_change: bool) -> Result<MouseData2>;
}

/// Always-fail mouse source for builds with no platform adapter wired in.
pub struct NullMouseSource;

impl MouseShapeSource for NullMouseSource {
    fn query(&mut self, _wait_for_change: bool) -> Result<MouseData> {
        Err(Error::Fail("no mouse-shape source configured".into()))
    }

    fn query2(&mut self, _wait_for_change: bool) -> Result<MouseData2> {
        Err(Error::Fail("no mouse-shape source configured".into()))
    }
}
