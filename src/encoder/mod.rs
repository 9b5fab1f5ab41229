//! Encoder contract and implementations, split one trait object per
//! variant the same way [`crate::context::backend`] splits `GraphicsApi`.

pub mod amf;
pub mod diff;
pub mod identity;

use crate::error::Result;
use crate::format::PixelFormat;
use crate::param::ParamState;

/// Codec an [`Encoder`] produces, where applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// Identity/difference encoders do not produce a codec bitstream.
    None,
    Avc,
    Hevc,
}

/// One opaque encoded output: a byte slice owned by the encoder, valid
/// until the next call to [`Encoder::get_encoded_frame`] on the same
/// instance.
pub struct EncodedFrame {
    pub data: Vec<u8>,
}

/// Shared contract for every encoder kind. All
/// operations take `&mut self`: encoders are owned exclusively by one
/// [`crate::session::Session`] and accessed under its lock.
pub trait Encoder: Send {
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Encodes the result-buffer at `src_idx`. `use_input_image` is true
    /// when the encoder should read the registered input image directly
    /// (CSC was skipped) rather than the post-CSC result buffer.
    fn encode(&mut self, src_idx: usize, use_input_image: bool) -> Result<()>;

    fn get_encoded_frame(&mut self) -> Result<EncodedFrame>;

    fn set_parameter(&mut self, name: u32, value: crate::param::Value) -> Result<()>;
    fn get_parameter(&self, name: u32, codec: Codec) -> Result<(crate::param::Value, ParamState)>;

    fn is_format_supported(&self, format: PixelFormat) -> bool;
    fn is_resize_supported(&self) -> bool;
    fn preferred_format(&self) -> PixelFormat;
    fn preferred_codec(&self) -> Codec;

    fn width(&self) -> u32;
    fn height(&self) -> u32;
}
