//! Passthrough encoder: exposes the CSC result buffer as the "encoded"
//! output, with no codec compression applied.

use super::{Codec, EncodedFrame, Encoder};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::param::{ParamState, Value};
use std::sync::Arc;

pub struct IdentityEncoder {
    context: Arc<Context>,
    width: u32,
    height: u32,
    /// Result-buffer index from the most recent `encode` call not yet
    /// consumed by `get_encoded_frame`.
    pending: Option<usize>,
}

impl IdentityEncoder {
    pub fn new(context: Arc<Context>, width: u32, height: u32) -> Self {
        Self {
            context,
            width,
            height,
            pending: None,
        }
    }
}

impl Encoder for IdentityEncoder {
    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.pending = None;
        Ok(())
    }

    fn encode(&mut self, src_idx: usize, _use_input_image: bool) -> Result<()> {
        self.pending = Some(src_idx);
        Ok(())
    }

    fn get_encoded_frame(&mut self) -> Result<EncodedFrame> {
        let idx = self.pending.take().ok_or(Error::NoEncodedFrame)?;
        let data = self.context.host_bytes(idx)?;
        Ok(EncodedFrame { data })
    }

    fn set_parameter(&mut self, _name: u32, _value: Value) -> Result<()> {
        Err(Error::InvalidEncoderParameter)
    }

    fn get_parameter(&self, _name: u32, _codec: Codec) -> Result<(Value, ParamState)> {
        Err(Error::InvalidEncoderParameter)
    }

    fn is_format_supported(&self, format: PixelFormat) -> bool {
        matches!(
            format,
            PixelFormat::Rgba8 | PixelFormat::Argb8 | PixelFormat::Bgra8 | PixelFormat::Nv12
        )
    }

    fn is_resize_supported(&self) -> bool {
        true
    }

    fn preferred_format(&self) -> PixelFormat {
        PixelFormat::Rgba8
    }

    fn preferred_codec(&self) -> Codec {
        Codec::None
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
