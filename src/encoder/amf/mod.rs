//! Wraps the vendor H.264/H.265 encoder component. Grounded on
//! `RFEncoderAMF.cpp`: the RF-to-vendor parameter mapping table
//! ([`params`]), the preset-driven `Usage` shortcut vs. per-parameter
//! apply path, the pre-submit override list, and the `Repeat`-retry submit
//! loop.

pub mod params;
mod sys;

use crate::error::{Error, Result};
use crate::ffi::properties as rf;
use crate::format::PixelFormat;
use crate::param::{ParamState, Value};
use params::AmfCodec;
use std::time::Duration;
use sys::AmfLibrary;

use super::{Codec, EncodedFrame, Encoder};

/// Access classification the vendor component reports for a property,
/// mirroring `AMF_PROPERTY_ACCESS_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAccess {
    Unknown,
    ReadOnly,
    /// Writable only before the component is initialized.
    PrivateAtInit,
    Writable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    UltraLowLatency,
    LowLatency,
    Transcoding,
}

#[derive(Debug)]
pub enum SubmitError {
    /// The component's input queue is full; the caller should retry.
    Repeat,
    Fail(String),
}

/// The vendor component's property-store/submit/query surface
/// (`AMFComponent` in the real SDK), mocked the same way as the other
/// external-collaborator seams in this crate; the wrapper logic in
/// [`AmfEncoder`] is the actual contribution, not a binding for the
/// proprietary AMF headers (see `DESIGN.md`).
pub trait VendorComponent: Send {
    fn set_property(&mut self, name: &str, value: Value) -> Result<()>;
    fn get_property(&self, name: &str) -> Option<Value>;
    fn property_access(&self, name: &str) -> PropertyAccess;
    fn set_usage(&mut self, usage: Usage);
    fn set_b_picture_count(&mut self, count: u32);
    fn submit_input(&mut self, surface_idx: usize, overrides: &[(u32, Value)]) -> std::result::Result<(), SubmitError>;
    fn query_output(&mut self, blocking: bool) -> std::result::Result<Option<Vec<u8>>, String>;
}

/// Factory producing a fresh vendor component for a codec. The real
/// component is created through the dynamically-loaded AMF factory entry
/// point, which this crate cannot call generically without the vendor's
/// headers; a host that has them installs its own factory via
/// [`install_vendor_factory`] (`once_cell`, set once, read many times --
/// the same "publish as immutable after first use" pattern as
/// [`crate::session::dopp`]'s display-adapter factory).
pub type VendorFactory = fn(AmfCodec) -> Result<Box<dyn VendorComponent>>;

static VENDOR_FACTORY: once_cell::sync::OnceCell<VendorFactory> = once_cell::sync::OnceCell::new();

pub fn install_vendor_factory(factory: VendorFactory) -> Result<()> {
    VENDOR_FACTORY.set(factory).map_err(|_| Error::InvalidConfig)
}

fn create_component(codec: AmfCodec) -> Result<Box<dyn VendorComponent>> {
    let factory = VENDOR_FACTORY
        .get()
        .ok_or_else(|| Error::AmfFail("no vendor component factory installed".into()))?;
    factory(codec)
}

const MAX_SUBMIT_RETRIES: u32 = 10;

pub struct AmfEncoder {
    _library: AmfLibrary,
    component: Box<dyn VendorComponent>,
    codec: AmfCodec,
    width: u32,
    height: u32,
    /// Pre-submit overrides enqueued by `set_parameter`, applied to the
    /// next surface then cleared.
    pending_overrides: Vec<(u32, Value)>,
    pending_frames: u32,
    blocking_read: bool,
    /// Shadow of `FRAME_RATE_DEN`: the vendor property stores only the
    /// numerator, so the denominator set via `ENCODER_FRAME_RATE_DEN` is
    /// tracked here and re-applied whenever either half of the pair changes.
    frame_rate_den_shadow: u32,
}

impl AmfEncoder {
    pub fn new(
        codec: AmfCodec,
        width: u32,
        height: u32,
        preset: Option<crate::param::Preset>,
        settings: &crate::param::ParamMap,
        blocking_read: bool,
    ) -> Result<Self> {
        let library = AmfLibrary::load()?;
        let component = create_component(codec)?;
        let mut encoder = Self {
            _library: library,
            component,
            codec,
            width,
            height,
            pending_overrides: Vec::new(),
            pending_frames: 0,
            blocking_read,
            frame_rate_den_shadow: 1,
        };
        encoder.apply_initial_settings(preset, settings)?;
        Ok(encoder)
    }

    fn apply_initial_settings(&mut self, preset: Option<crate::param::Preset>, settings: &crate::param::ParamMap) -> Result<()> {
        if let Some(preset) = preset {
            let usage = match preset {
                crate::param::Preset::Fast => Usage::UltraLowLatency,
                crate::param::Preset::Balanced => Usage::LowLatency,
                crate::param::Preset::Quality => Usage::Transcoding,
            };
            self.component.set_usage(usage);
        } else {
            for param in settings.iter() {
                if params::is_presubmit(self.codec, param.name) {
                    continue;
                }
                let Some(amf_name) = params::lookup(self.codec, param.name) else {
                    continue;
                };
                match self.component.property_access(amf_name) {
                    PropertyAccess::Writable => {
                        if let Err(err) = self.set_amf_property(param.name, param.value()) {
                            if !matches!(err, Error::ParamAccessDenied) {
                                log::warn!("applying preset-free parameter {amf_name} failed: {err}");
                                return Err(err);
                            }
                        }
                    }
                    _ => continue,
                }
            }
        }
        if self.codec == AmfCodec::Avc {
            self.component.set_b_picture_count(0);
        }
        Ok(())
    }

    fn set_amf_property(&mut self, rf_name: u32, value: Value) -> Result<()> {
        let amf_name = params::lookup(self.codec, rf_name).ok_or(Error::InvalidEncoderParameter)?;
        let (rate_name, rate_den_name) = match self.codec {
            AmfCodec::Avc => (rf::ENCODER_FRAME_RATE, rf::ENCODER_FRAME_RATE_DEN),
            AmfCodec::Hevc => (rf::ENCODER_HEVC_FRAMERATE, rf::ENCODER_HEVC_FRAMERATE_DEN),
        };
        if rf_name == rate_name || rf_name == rate_den_name {
            // Both names address the same vendor rational property; mutate
            // one field and write the pair back.
            let (mut num, mut den) = self.frame_rate_pair();
            if rf_name == rate_name {
                num = value.as_u32().ok_or(Error::InvalidEncoderParameter)?;
            } else {
                den = value.as_u32().ok_or(Error::InvalidEncoderParameter)?;
            }
            self.component.set_property(amf_name, Value::UInt(num))?;
            self.frame_rate_den_shadow = den;
            return Ok(());
        }
        if self.component.property_access(amf_name) != PropertyAccess::Writable {
            return Err(Error::ParamAccessDenied);
        }
        self.component.set_property(amf_name, value)
    }

    fn frame_rate_pair(&self) -> (u32, u32) {
        let framerate_name = match self.codec {
            AmfCodec::Avc => params::amf_name::FRAMERATE,
            AmfCodec::Hevc => params::amf_name_hevc::FRAMERATE,
        };
        let num = self.component.get_property(framerate_name).and_then(Value::as_u32).unwrap_or(0);
        (num, self.frame_rate_den_shadow)
    }
}

impl Encoder for AmfEncoder {
    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.pending_frames = 0;
        Ok(())
    }

    fn encode(&mut self, src_idx: usize, _use_input_image: bool) -> Result<()> {
        let overrides = std::mem::take(&mut self.pending_overrides);
        let mut attempt = 0;
        loop {
            match self.component.submit_input(src_idx, &overrides) {
                Ok(()) => {
                    self.pending_frames += 1;
                    return Ok(());
                }
                Err(SubmitError::Fail(msg)) => return Err(Error::AmfFail(msg)),
                Err(SubmitError::Repeat) => {
                    attempt += 1;
                    if attempt >= MAX_SUBMIT_RETRIES {
                        return Err(Error::AmfFail("SubmitInput queue full after retries".into()));
                    }
                    let sleep = if attempt > 2 { Duration::from_millis(5) } else { Duration::from_millis(1) };
                    std::thread::sleep(sleep);
                }
            }
        }
    }

    fn get_encoded_frame(&mut self) -> Result<EncodedFrame> {
        let blocking = self.blocking_read || self.pending_frames > 2;
        if blocking {
            loop {
                match self.component.query_output(true) {
                    Ok(Some(data)) => {
                        self.pending_frames = self.pending_frames.saturating_sub(1);
                        return Ok(EncodedFrame { data });
                    }
                    Ok(None) => std::thread::sleep(Duration::from_millis(1)),
                    Err(msg) => return Err(Error::AmfFail(msg)),
                }
            }
        }
        match self.component.query_output(false) {
            Ok(Some(data)) => {
                self.pending_frames = self.pending_frames.saturating_sub(1);
                Ok(EncodedFrame { data })
            }
            Ok(None) => Err(Error::NoEncodedFrame),
            Err(msg) => Err(Error::AmfFail(msg)),
        }
    }

    fn set_parameter(&mut self, name: u32, value: Value) -> Result<()> {
        if params::is_presubmit(self.codec, name) {
            if value.as_bool().unwrap_or(value.as_u32().unwrap_or(0) != 0) {
                self.pending_overrides.retain(|(n, _)| *n != name);
                self.pending_overrides.push((name, value));
            }
            return Ok(());
        }
        self.set_amf_property(name, value)
    }

    fn get_parameter(&self, name: u32, codec: Codec) -> Result<(Value, ParamState)> {
        if codec == Codec::None {
            return Err(Error::InvalidEncoderParameter);
        }
        if params::is_presubmit(self.codec, name) {
            return Ok((Value::UInt(0), ParamState::Ready));
        }
        let amf_name = params::lookup(self.codec, name).ok_or(Error::InvalidEncoderParameter)?;
        let value = self.component.get_property(amf_name).unwrap_or(Value::UInt(0));
        let state = match self.component.property_access(amf_name) {
            PropertyAccess::Unknown => ParamState::Invalid,
            PropertyAccess::ReadOnly | PropertyAccess::PrivateAtInit => ParamState::Blocked,
            PropertyAccess::Writable => ParamState::Ready,
        };
        Ok((value, state))
    }

    fn is_format_supported(&self, format: PixelFormat) -> bool {
        matches!(format, PixelFormat::Nv12 | PixelFormat::Bgra8)
    }

    fn is_resize_supported(&self) -> bool {
        true
    }

    fn preferred_format(&self) -> PixelFormat {
        PixelFormat::Nv12
    }

    fn preferred_codec(&self) -> Codec {
        match self.codec {
            AmfCodec::Avc => Codec::Avc,
            AmfCodec::Hevc => Codec::Hevc,
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
