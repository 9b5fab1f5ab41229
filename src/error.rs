//! Error taxonomy for the capture/encode pipeline.
//!
//! Mirrors the status-code enum of the original C API (`RFStatus`) one-to-one
//! so the FFI boundary in [`crate::ffi`] can translate every variant to a
//! stable integer without guesswork. Flow-control signals (`QueueFull`,
//! `NoEncodedFrame`, ...) are ordinary variants here, not a separate type:
//! callers on the happy path already match on `Result`, so a second error
//! channel would only split that matching in two.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("out of memory")]
    MemoryFail,
    #[error("render target allocation failed")]
    RenderTargetFail,

    #[error("OpenGL interop failed")]
    OpenGlFail,
    #[error("compute backend failed: {0}")]
    Compute(String),
    #[error("desktop capture (DOPP) failed: {0}")]
    DoppFail(String),
    #[error("AMF encoder failed: {0}")]
    AmfFail(String),

    #[error("queue is full")]
    QueueFull,
    #[error("no encoded frame available")]
    NoEncodedFrame,
    #[error("no desktop update available")]
    DoppNoUpdate,
    #[error("mouse shape has not changed")]
    MouseGrabNoChange,

    #[error("invalid session")]
    InvalidSession,
    #[error("invalid context")]
    InvalidContext,
    #[error("invalid texture handle")]
    InvalidTexture,
    #[error("invalid dimensions")]
    InvalidDimension,
    #[error("invalid index")]
    InvalidIndex,
    #[error("invalid pixel format")]
    InvalidFormat,
    #[error("invalid configuration")]
    InvalidConfig,
    #[error("invalid encoder")]
    InvalidEncoder,
    #[error("invalid render target")]
    InvalidRenderTarget,
    #[error("invalid desktop id")]
    InvalidDesktopId,
    #[error("invalid OpenGL context")]
    InvalidOpenGlContext,
    #[error("invalid D3D device")]
    InvalidD3DDevice,
    #[error("invalid compute environment")]
    InvalidComputeEnv,
    #[error("invalid compute context")]
    InvalidComputeContext,
    #[error("invalid compute memory object")]
    InvalidComputeMemObj,
    #[error("invalid session properties")]
    InvalidSessionProperties,
    #[error("invalid encoder parameter")]
    InvalidEncoderParameter,
    #[error("parameter access denied")]
    ParamAccessDenied,

    #[error("{0}")]
    Fail(String),
}

impl Error {
    /// True for the flow-control signals that the propagation policy in
    /// §7 forbids logging as errors.
    pub fn is_flow_control(&self) -> bool {
        matches!(
            self,
            Error::QueueFull
                | Error::NoEncodedFrame
                | Error::DoppNoUpdate
                | Error::MouseGrabNoChange
        )
    }

    /// Stable integer status code matching the original `RFStatus` values.
    pub fn status_code(&self) -> i32 {
        match self {
            Error::Fail(_) => -1,
            Error::MemoryFail => -2,
            Error::RenderTargetFail => -3,
            Error::OpenGlFail => -4,
            Error::Compute(_) => -5,
            Error::DoppFail(_) => -6,
            Error::AmfFail(_) => -8,
            Error::QueueFull => -10,
            Error::NoEncodedFrame => -11,
            Error::ParamAccessDenied => -13,
            Error::MouseGrabNoChange => -15,
            Error::DoppNoUpdate => -16,
            Error::InvalidSession => -30,
            Error::InvalidContext => -31,
            Error::InvalidTexture => -32,
            Error::InvalidDimension => -33,
            Error::InvalidIndex => -34,
            Error::InvalidFormat => -35,
            Error::InvalidConfig => -36,
            Error::InvalidEncoder => -37,
            Error::InvalidRenderTarget => -39,
            Error::InvalidDesktopId => -41,
            Error::InvalidOpenGlContext => -43,
            Error::InvalidD3DDevice => -44,
            Error::InvalidComputeEnv => -46,
            Error::InvalidComputeContext => -47,
            Error::InvalidComputeMemObj => -48,
            Error::InvalidSessionProperties => -49,
            Error::InvalidEncoderParameter => -50,
        }
    }
}

/// Logs `err` at the level dictated by the propagation policy: flow-control
/// signals at `debug`, everything else at `error`.
pub fn log_outcome(context: &str, err: &Error) {
    if err.is_flow_control() {
        log::debug!("{context}: {err}");
    } else {
        log::error!("{context}: {err}");
    }
}

/// Thin wrapper so the FFI layer can log a human-readable status without
/// pulling the full `Error` type across the boundary.
#[derive(Debug)]
pub struct StatusDisplay(pub i32);

impl fmt::Display for StatusDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status({})", self.0)
    }
}
