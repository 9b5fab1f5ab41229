//! `rapidcap` -- a capture/encode pipeline for turning a live render target
//! (or the desktop itself) into H.264/HEVC frames through a difference-aware
//! compute stage.
//!
//! The crate exposes two layers:
//!
//! - [`session::Session`], the native Rust API: create a session, register
//!   render targets or a desktop capture source, build an encoder, and pull
//!   encoded frames.
//! - [`ffi`], a C ABI (`rf_*` functions) for embedding in non-Rust hosts,
//!   mirroring the session API one entry point at a time.

pub mod context;
pub mod encoder;
pub mod error;
pub mod ffi;
pub mod format;
pub mod logging;
pub mod param;
pub mod session;
pub mod sync;

pub use error::{Error, Result};
pub use format::PixelFormat;
pub use param::{ParamState, ParamType, Preset, Value};
pub use session::Session;
