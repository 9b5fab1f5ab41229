//! C API surface, mirroring `RapidFire.h`'s `rf*` function table one-to-one.
//! Every entry point returns an `RFStatus`-shaped `i32` (see
//! [`crate::error::Error::status_code`]) and never unwinds across the FFI
//! boundary -- a panicking callback (e.g. a bug in a host-installed
//! [`crate::context::install_interop_factory`]) is caught and translated to
//! `RF_STATUS_FAIL` rather than aborting the host process.

pub mod properties;

use crate::error::Error;
use crate::param::{ParamState, Preset, Value};
use crate::session::dopp::NotificationKind;
use crate::session::mouse::{BitmapBuffer, MouseData, MouseData2};
use crate::session::Session;
use parking_lot::Mutex;
use std::os::raw::{c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::ptr;
use std::slice;

/// Opaque session handle, matching `RFEncodeSession` (`typedef void*`).
pub type RfSession = *mut c_void;

/// Everything a C caller can hold a live pointer into: the session itself,
/// plus the side buffers that back the "valid until the next call on this
/// session" pointers `rfGetEncodedFrame`/`rfGetSourceFrame`/the mouse-data
/// functions hand out. The original returns pointers into encoder-owned
/// memory for the same reason.
struct SessionHandle {
    session: Session,
    last_encoded: Mutex<Vec<u8>>,
    last_source: Mutex<Vec<u8>>,
    last_mouse: Mutex<MouseData>,
    last_mouse2: Mutex<MouseData2>,
}

fn status_ok() -> c_int {
    0
}

fn status_of(err: &Error) -> c_int {
    err.status_code() as c_int
}

/// Reads a zero-terminated `(name, value)` `intptr_t` pair list into typed
/// `Value`s via [`properties::value_type`]. Null-safe: a null pointer reads
/// as an empty list, matching `rfCreateEncodeSession(&s, nullptr)`.
unsafe fn read_property_list(ptr: *const isize) -> Vec<(u32, Value)> {
    if ptr.is_null() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut cursor = ptr;
    loop {
        let name = *cursor;
        if name == 0 {
            break;
        }
        let raw = *cursor.add(1);
        let name = name as u32;
        let ty = properties::value_type(name);
        let value = match ty {
            crate::param::ParamType::Bool => Value::Bool(raw != 0),
            crate::param::ParamType::Int => Value::Int(raw as i32),
            crate::param::ParamType::UInt => Value::UInt(raw as u32),
            crate::param::ParamType::Ptr => Value::Ptr(raw as usize),
        };
        out.push((name, value));
        cursor = cursor.add(2);
    }
    out
}

unsafe fn handle<'a>(session: RfSession) -> Option<&'a SessionHandle> {
    (session as *const SessionHandle).as_ref()
}

/// Runs `f`, translating a panic (e.g. from a host-installed factory
/// callback) into `RF_STATUS_FAIL` instead of unwinding into C.
fn guard(f: impl FnOnce() -> c_int) -> c_int {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        log::error!("panic caught at the FFI boundary");
        Error::Fail("internal panic".into()).status_code() as c_int
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_create_encode_session(session_out: *mut RfSession, properties: *const isize) -> c_int {
    guard(|| {
        if session_out.is_null() {
            return status_of(&Error::InvalidSession);
        }
        *session_out = ptr::null_mut();
        let props = read_property_list(properties);
        let kernel_cache_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        match Session::create(&props, kernel_cache_dir) {
            Ok(session) => {
                let boxed = Box::new(SessionHandle {
                    session,
                    last_encoded: Mutex::new(Vec::new()),
                    last_source: Mutex::new(Vec::new()),
                    last_mouse: Mutex::new(MouseData::default()),
                    last_mouse2: Mutex::new(MouseData2::default()),
                });
                *session_out = Box::into_raw(boxed) as RfSession;
                status_ok()
            }
            Err(err) => {
                crate::error::log_outcome("rfCreateEncodeSession", &err);
                status_of(&err)
            }
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_delete_encode_session(session: *mut RfSession) -> c_int {
    guard(|| {
        if session.is_null() || (*session).is_null() {
            return status_of(&Error::InvalidSession);
        }
        drop(Box::from_raw(*session as *mut SessionHandle));
        *session = ptr::null_mut();
        status_ok()
    })
}

/// Maps `RFEncodePreset`'s AVC presets (0..=2). HEVC preset shortcuts
/// (3..=5) and `RF_PRESET_NONE` (-1) are not modeled -- select HEVC through
/// `rf_create_encoder2` with `RF_ENCODER_CODEC` instead.
fn preset_from_c(preset: c_int) -> Option<Preset> {
    match preset {
        0 => Some(Preset::Fast),
        1 => Some(Preset::Balanced),
        2 => Some(Preset::Quality),
        _ => None,
    }
}

#[no_mangle]
pub unsafe extern "C" fn rf_create_encoder(session: RfSession, width: u32, height: u32, preset: c_int) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        let Some(preset) = preset_from_c(preset) else {
            return status_of(&Error::InvalidConfig);
        };
        match handle.session.create_encoder(width, height, preset) {
            Ok(()) => status_ok(),
            Err(err) => {
                crate::error::log_outcome("rfCreateEncoder", &err);
                status_of(&err)
            }
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_create_encoder2(session: RfSession, width: u32, height: u32, properties: *const isize) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        let props = read_property_list(properties);
        match handle.session.create_encoder2(width, height, &props) {
            Ok(()) => status_ok(),
            Err(err) => {
                crate::error::log_outcome("rfCreateEncoder2", &err);
                status_of(&err)
            }
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_register_render_target(session: RfSession, render_target: usize, width: u32, height: u32, idx_out: *mut u32) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        if idx_out.is_null() {
            return status_of(&Error::InvalidIndex);
        }
        let foreign = crate::context::ForeignHandle {
            api: handle.session.graphics_api(),
            raw: render_target,
        };
        match handle.session.register_render_target(foreign, width, height) {
            Ok(idx) => {
                *idx_out = idx as u32;
                status_ok()
            }
            Err(err) => status_of(&err),
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_remove_render_target(session: RfSession, idx: u32) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        match handle.session.remove_render_target(idx as usize) {
            Ok(()) => status_ok(),
            Err(err) => status_of(&err),
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_get_render_target_state(session: RfSession, idx: u32, state_out: *mut c_int) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        if state_out.is_null() {
            return status_of(&Error::InvalidIndex);
        }
        match handle.session.render_target_state(idx as usize) {
            Ok(state) => {
                *state_out = match state {
                    crate::context::RtState::Invalid => -1,
                    crate::context::RtState::Free => 0,
                    crate::context::RtState::Blocked => 1,
                };
                status_ok()
            }
            Err(err) => status_of(&err),
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_resize_session(session: RfSession, width: u32, height: u32) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        match handle.session.resize(width, height) {
            Ok(()) => status_ok(),
            Err(err) => {
                crate::error::log_outcome("rfResizeSession", &err);
                status_of(&err)
            }
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_encode_frame(session: RfSession, idx: u32) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        match handle.session.encode_frame(idx as usize) {
            Ok(()) => status_ok(),
            Err(err) => {
                crate::error::log_outcome("rfEncodeFrame", &err);
                status_of(&err)
            }
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_get_encoded_frame(session: RfSession, size_out: *mut u32, data_out: *mut *const u8) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        if size_out.is_null() || data_out.is_null() {
            return status_of(&Error::InvalidIndex);
        }
        match handle.session.get_encoded_frame() {
            Ok(frame) => {
                let mut stash = handle.last_encoded.lock();
                *stash = frame.data;
                *size_out = stash.len() as u32;
                *data_out = stash.as_ptr();
                status_ok()
            }
            Err(err) => {
                crate::error::log_outcome("rfGetEncodedFrame", &err);
                *size_out = 0;
                *data_out = ptr::null();
                status_of(&err)
            }
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_get_source_frame(session: RfSession, size_out: *mut u32, data_out: *mut *const u8) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        if size_out.is_null() || data_out.is_null() {
            return status_of(&Error::InvalidIndex);
        }
        match handle.session.get_source_frame() {
            Ok(bytes) => {
                let mut stash = handle.last_source.lock();
                *stash = bytes;
                *size_out = stash.len() as u32;
                *data_out = stash.as_ptr();
                status_ok()
            }
            Err(err) => {
                *size_out = 0;
                *data_out = ptr::null();
                status_of(&err)
            }
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_set_encode_parameter(session: RfSession, property: c_int, value: isize) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        match handle.session.set_encode_parameter_raw(property as u32, value) {
            Ok(()) => status_ok(),
            Err(err) => status_of(&err),
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_get_encode_parameter(session: RfSession, property: c_int, value_out: *mut isize) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        if value_out.is_null() {
            return status_of(&Error::InvalidEncoderParameter);
        }
        match handle.session.get_encode_parameter_raw(property as u32) {
            Ok((raw, state)) => {
                *value_out = raw;
                if state == ParamState::Invalid {
                    status_of(&Error::InvalidEncoderParameter)
                } else {
                    status_ok()
                }
            }
            Err(err) => status_of(&err),
        }
    })
}

#[repr(C)]
pub struct RfBitmapBuffer {
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub bits_per_pixel: u32,
    pub pixels: *const u8,
}

fn empty_bitmap() -> RfBitmapBuffer {
    RfBitmapBuffer {
        width: 0,
        height: 0,
        pitch: 0,
        bits_per_pixel: 0,
        pixels: ptr::null(),
    }
}

fn bitmap_view(buf: &BitmapBuffer) -> RfBitmapBuffer {
    RfBitmapBuffer {
        width: buf.width,
        height: buf.height,
        pitch: buf.pitch,
        bits_per_pixel: buf.bits_per_pixel,
        pixels: if buf.pixels.is_empty() { ptr::null() } else { buf.pixels.as_ptr() },
    }
}

#[repr(C)]
pub struct RfMouseData {
    pub visible: c_int,
    pub hot_x: u32,
    pub hot_y: u32,
    pub mask: RfBitmapBuffer,
    pub color: RfBitmapBuffer,
}

#[repr(C)]
pub struct RfMouseData2 {
    pub visible: c_int,
    pub hot_x: u32,
    pub hot_y: u32,
    pub flags: u32,
    pub shape: RfBitmapBuffer,
}

#[no_mangle]
pub unsafe extern "C" fn rf_get_mouse_data(session: RfSession, wait_for_shape_change: c_int, out: *mut RfMouseData) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        if out.is_null() {
            return status_of(&Error::Fail("null mouse data output".into()));
        }
        match handle.session.get_mouse_data(wait_for_shape_change != 0) {
            Ok(data) => {
                let mut stash = handle.last_mouse.lock();
                *stash = data;
                (*out).visible = stash.visible as c_int;
                (*out).hot_x = stash.hot_x;
                (*out).hot_y = stash.hot_y;
                (*out).mask = bitmap_view(&stash.mask);
                (*out).color = bitmap_view(&stash.color);
                status_ok()
            }
            Err(err) => {
                (*out).visible = 0;
                (*out).mask = empty_bitmap();
                (*out).color = empty_bitmap();
                status_of(&err)
            }
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_get_mouse_data2(session: RfSession, wait_for_shape_change: c_int, out: *mut RfMouseData2) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        if out.is_null() {
            return status_of(&Error::Fail("null mouse data output".into()));
        }
        match handle.session.get_mouse_data2(wait_for_shape_change != 0) {
            Ok(data) => {
                let mut stash = handle.last_mouse2.lock();
                *stash = data;
                (*out).visible = stash.visible as c_int;
                (*out).hot_x = stash.hot_x;
                (*out).hot_y = stash.hot_y;
                (*out).flags = stash.flags;
                (*out).shape = bitmap_view(&stash.shape);
                status_ok()
            }
            Err(err) => {
                (*out).visible = 0;
                (*out).flags = 0;
                (*out).shape = empty_bitmap();
                status_of(&err)
            }
        }
    })
}

#[no_mangle]
pub unsafe extern "C" fn rf_release_event(session: RfSession, notification: c_int) -> c_int {
    guard(|| {
        let Some(handle) = handle(session) else {
            return status_of(&Error::InvalidSession);
        };
        let kind = match notification {
            1 => NotificationKind::DesktopChange,
            2 => NotificationKind::MouseShape,
            _ => return status_of(&Error::InvalidConfig),
        };
        match handle.session.release_event(kind) {
            Ok(()) => status_ok(),
            Err(err) => status_of(&err),
        }
    })
}

/// Silences the "never constructed" warning `slice`/unused-import lints
/// would otherwise raise once every helper above settles; kept for
/// call sites that need to read a raw property list's length up front.
#[allow(dead_code)]
unsafe fn property_list_len(ptr: *const isize) -> usize {
    if ptr.is_null() {
        return 0;
    }
    let mut len = 0;
    let mut cursor = ptr;
    while *cursor != 0 {
        len += 1;
        cursor = cursor.add(2);
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_list_reads_typed_pairs() {
        let list: [isize; 5] = [
            properties::FLIP_SOURCE as isize,
            1,
            properties::ENCODER_BITRATE as isize,
            5_000_000,
            0,
        ];
        let parsed = unsafe { read_property_list(list.as_ptr()) };
        assert_eq!(parsed, vec![(properties::FLIP_SOURCE, Value::Bool(true)), (properties::ENCODER_BITRATE, Value::UInt(5_000_000))]);
    }

    #[test]
    fn null_property_list_is_empty() {
        let parsed = unsafe { read_property_list(ptr::null()) };
        assert!(parsed.is_empty());
    }

    #[test]
    fn preset_mapping_rejects_hevc_shortcuts_and_none() {
        assert_eq!(preset_from_c(0), Some(Preset::Fast));
        assert_eq!(preset_from_c(2), Some(Preset::Quality));
        assert_eq!(preset_from_c(3), None);
        assert_eq!(preset_from_c(-1), None);
    }

    #[test]
    fn property_list_len_counts_pairs() {
        let list: [isize; 5] = [1, 10, 2, 20, 0];
        assert_eq!(unsafe { property_list_len(list.as_ptr()) }, 2);
    }
}
