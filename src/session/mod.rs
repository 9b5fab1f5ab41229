//! Session: the pipeline state machine. Owns the compute context, at most
//! one encoder, the session- and encoder-parameter maps, and the in-flight
//! FIFO; exposes the operations the C API (`crate::ffi`) marshals.

pub mod dopp;
pub mod mouse;

use crate::context::{
    resolve_interop, Context, ContextDesc, CscKernel, ForeignHandle, GraphicsApi, FORMAT_TAG_ARGB, FORMAT_TAG_BGRA, FORMAT_TAG_RGBA,
};
use crate::encoder::amf::params::AmfCodec;
use crate::encoder::amf::AmfEncoder;
use crate::encoder::diff::DifferenceEncoder;
use crate::encoder::identity::IdentityEncoder;
use crate::encoder::{EncodedFrame, Encoder};
use crate::error::{Error, Result};
use crate::ffi::properties as rf;
use crate::format::PixelFormat;
use crate::logging::SessionLog;
use crate::param::{ParamMap, ParamState, ParamType, Preset, Value};
use crate::sync::{BoundedFifo, CriticalSection};
use dopp::{ChangeMode, DesktopCapture, DesktopIdentifier, NotificationKind};
use mouse::{MouseData, MouseData2, MouseShapeSource};
use std::path::PathBuf;
use std::sync::Arc;

/// Serializes session creation/deletion, which touch process-global state
/// (the log-cleanup flag, the lazily-initialized backend factories).
static GLOBAL_SESSION_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderKind {
    Amf,
    Identity,
    Difference,
}

impl EncoderKind {
    fn from_property(value: i32) -> Option<Self> {
        match value {
            0 => Some(EncoderKind::Amf),
            1 => Some(EncoderKind::Identity),
            2 => Some(EncoderKind::Difference),
            _ => None,
        }
    }
}

/// Resolved session-level properties, fixed at creation.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub flip: bool,
    pub async_copy: bool,
    pub blocking_read: bool,
    pub mouse_data: bool,
    pub encoder_kind: EncoderKind,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            flip: false,
            async_copy: false,
            blocking_read: false,
            mouse_data: false,
            encoder_kind: EncoderKind::Identity,
        }
    }
}

fn desktop_identifier(properties: &[(u32, Value)]) -> Result<Option<DesktopIdentifier>> {
    let mut found = None;
    for &(name, value) in properties {
        let candidate = match name {
            rf::DESKTOP => Some(DesktopIdentifier::Vendor(value.as_u32().unwrap_or(0))),
            rf::DESKTOP_DSP_ID => Some(DesktopIdentifier::PlatformDisplay(value.as_u32().unwrap_or(0))),
            rf::DESKTOP_INTERNAL_DSP_ID => Some(DesktopIdentifier::Internal(value.as_u32().unwrap_or(0))),
            _ => None,
        };
        if let Some(candidate) = candidate {
            if found.is_some() {
                return Err(Error::InvalidDesktopId);
            }
            found = Some(candidate);
        }
    }
    Ok(found)
}

fn graphics_api(properties: &[(u32, Value)]) -> GraphicsApi {
    for &(name, _) in properties {
        match name {
            rf::GL_GRAPHICS_CTX | rf::GL_DEVICE_CTX => return GraphicsApi::OpenGl,
            rf::D3D9_DEVICE => return GraphicsApi::D3D9,
            rf::D3D9EX_DEVICE => return GraphicsApi::D3D9Ex,
            rf::D3D11_DEVICE => return GraphicsApi::D3D11,
            _ => {}
        }
    }
    GraphicsApi::None
}

fn resolve_settings(properties: &[(u32, Value)]) -> Result<SessionSettings> {
    let mut settings = SessionSettings::default();
    for &(name, value) in properties {
        match name {
            rf::FLIP_SOURCE => settings.flip = value.as_bool().unwrap_or(false),
            rf::ASYNC_SOURCE_COPY => settings.async_copy = value.as_bool().unwrap_or(false),
            rf::ENCODER_BLOCKING_READ => settings.blocking_read = value.as_bool().unwrap_or(false),
            rf::MOUSE_DATA => settings.mouse_data = value.as_bool().unwrap_or(false),
            rf::ENCODER => {
                settings.encoder_kind = EncoderKind::from_property(value.as_i32().unwrap_or(-1)).ok_or(Error::InvalidSessionProperties)?;
            }
            _ => {}
        }
    }
    Ok(settings)
}

struct SessionInner {
    log: SessionLog,
    settings: SessionSettings,
    params: ParamMap,
    encoder: Option<Box<dyn Encoder>>,
    encoder_settings: ParamMap,
    fifo: BoundedFifo,
    next_result: usize,
    width: u32,
    height: u32,
    /// Resolved once at `create_encoder`/`create_encoder2` time: whether
    /// `encode_frame` needs to run a CSC kernel at all, or can take the
    /// plain `copy_texture_to_buffer` fast path in `Context::process_buffer`.
    encoder_csc: bool,
    capture: Option<DesktopCapture>,
    mouse: Option<Box<dyn MouseShapeSource>>,
}

pub struct Session {
    id: u64,
    context: Arc<Context>,
    api: GraphicsApi,
    inner: CriticalSection<SessionInner>,
}

impl Session {
    pub fn create(properties: &[(u32, Value)], kernel_cache_dir: PathBuf) -> Result<Self> {
        let _global = GLOBAL_SESSION_LOCK.lock();

        let settings = resolve_settings(properties)?;
        let desktop_id = desktop_identifier(properties)?;
        let api = graphics_api(properties);

        let id = crate::logging::next_session_id();
        let mut log = SessionLog::open(id);
        log.event(&format!("session created, encoder_kind={:?}", settings.encoder_kind));

        let interop = resolve_interop(api)?;
        let context = Arc::new(Context::new(
            ContextDesc {
                api,
                async_copy: settings.async_copy,
                kernel_cache_dir,
            },
            interop,
        )?);

        let capture = match desktop_id {
            Some(id) => {
                let (adapter, mouse_adapter) = dopp::create_adapter(id, settings.mouse_data)?;
                let update_on_change = properties.iter().any(|&(n, v)| n == rf::DESKTOP_UPDATE_ON_CHANGE && v.as_bool().unwrap_or(false));
                let block_until_change = properties.iter().any(|&(n, v)| n == rf::DESKTOP_BLOCK_UNTIL_CHANGE && v.as_bool().unwrap_or(false));
                let mode = if block_until_change {
                    ChangeMode::BlockUntilChange
                } else if update_on_change {
                    ChangeMode::UpdateOnChange
                } else {
                    ChangeMode::Polling
                };
                let mut capture = DesktopCapture::new(adapter, mode)?;
                capture.register_framebuffers(&context)?;
                Some((capture, mouse_adapter))
            }
            None => None,
        };

        let (capture, mouse) = match capture {
            Some((capture, mouse)) => (Some(capture), mouse),
            None => (None, None),
        };

        let mut params = ParamMap::new();
        register_session_params(&mut params, &settings);

        Ok(Self {
            id,
            context,
            api,
            inner: CriticalSection::new(SessionInner {
                log,
                settings,
                params,
                encoder: None,
                encoder_settings: ParamMap::new(),
                fifo: BoundedFifo::new(crate::context::NUM_RESULTS),
                next_result: 0,
                width: 0,
                height: 0,
                encoder_csc: true,
                capture,
                mouse,
            }),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Reads `ENCODER_CODEC` straight out of the raw property list, before any
    /// `ParamMap` exists: the AMF parameter table itself is codec-dependent
    /// (`g_PropertyNameMap` vs. `g_HEVCPropertyNameMap`), so the codec must be
    /// known before `register_encoder_params` builds that table.
    fn resolve_amf_codec(properties: &[(u32, Value)]) -> AmfCodec {
        match properties.iter().find(|&&(name, _)| name == rf::ENCODER_CODEC).and_then(|&(_, v)| v.as_i32()) {
            Some(1) => AmfCodec::Hevc,
            _ => AmfCodec::Avc,
        }
    }

    fn build_encoder(kind: EncoderKind, context: Arc<Context>, width: u32, height: u32, preset: Option<Preset>, blocking_read: bool, codec: AmfCodec, encoder_settings: &ParamMap) -> Result<Box<dyn Encoder>> {
        match kind {
            EncoderKind::Identity => Ok(Box::new(IdentityEncoder::new(context, width, height))),
            EncoderKind::Difference => Ok(Box::new(DifferenceEncoder::new(context, width, height)?)),
            EncoderKind::Amf => Ok(Box::new(AmfEncoder::new(codec, width, height, preset, encoder_settings, blocking_read)?)),
        }
    }

    /// A desktop source or a flip always needs the CSC/reorder kernel;
    /// otherwise CSC is only needed when the encoder doesn't want plain
    /// RGBA8, matching `Context::process_buffer`'s `copy_texture_to_buffer`
    /// fast path for the identity RGBA8-to-RGBA8 case. Resolved once at
    /// encoder-creation time rather than re-derived from encoder capability
    /// queries every frame.
    fn resolve_encoder_csc(capture_present: bool, flip: bool, preferred_format: PixelFormat) -> bool {
        capture_present || flip || preferred_format != PixelFormat::Rgba8
    }

    fn resolve_csc(format: PixelFormat) -> (bool, CscKernel, u32) {
        match format {
            PixelFormat::Nv12 => (true, CscKernel::RgbaToNv12Interleaved, 0),
            PixelFormat::Rgba8 => (true, CscKernel::CopyReorder, FORMAT_TAG_RGBA),
            PixelFormat::Argb8 => (true, CscKernel::CopyReorder, FORMAT_TAG_ARGB),
            PixelFormat::Bgra8 => (true, CscKernel::CopyReorder, FORMAT_TAG_BGRA),
        }
    }

    /// `rfCreateEncoder`: preset-driven construction with default parameters.
    pub fn create_encoder(&self, width: u32, height: u32, preset: Preset) -> Result<()> {
        self.create_encoder_inner(width, height, Some(preset), &[])
    }

    /// `rfCreateEncoder2`: explicit static/dynamic property list, no preset.
    pub fn create_encoder2(&self, width: u32, height: u32, properties: &[(u32, Value)]) -> Result<()> {
        self.create_encoder_inner(width, height, None, properties)
    }

    fn create_encoder_inner(&self, width: u32, height: u32, preset: Option<Preset>, properties: &[(u32, Value)]) -> Result<()> {
        let mut inner = self.inner.lock();
        let codec = Self::resolve_amf_codec(properties);
        let mut encoder_settings = ParamMap::new();
        register_encoder_params(&mut encoder_settings, codec);
        for &(name, value) in properties {
            if encoder_settings.contains(name) {
                encoder_settings.set_internal(name, value, ParamState::Ready);
            }
        }

        let encoder = Self::build_encoder(inner.settings.encoder_kind, self.context.clone(), width, height, preset, inner.settings.blocking_read, codec, &encoder_settings)?;
        self.context.create_result_buffers(encoder.preferred_format())?;

        inner.encoder_csc = Self::resolve_encoder_csc(inner.capture.is_some(), inner.settings.flip, encoder.preferred_format());

        inner.encoder = Some(encoder);
        inner.encoder_settings = encoder_settings;
        inner.width = width;
        inner.height = height;
        inner.fifo = BoundedFifo::new(crate::context::NUM_RESULTS);
        inner.next_result = 0;
        inner.log.event(&format!("encoder created {width}x{height}"));
        Ok(())
    }

    pub fn register_render_target(&self, handle: ForeignHandle, width: u32, height: u32) -> Result<usize> {
        let inner = self.inner.lock();
        if inner.capture.is_some() {
            return Err(Error::Fail("application-supplied render targets are refused for desktop sessions".into()));
        }
        drop(inner);
        self.context.register_image(handle, width, height)
    }

    pub fn remove_render_target(&self, idx: usize) -> Result<()> {
        self.context.unregister_image(idx)
    }

    pub fn render_target_state(&self, idx: usize) -> Result<crate::context::RtState> {
        self.context.render_target_state(idx)
    }

    /// The desktop's native capture resolution, for desktop sessions;
    /// `None` for render-target sessions (the caller dictates dimensions).
    pub fn capture_dimensions(&self) -> Option<(u32, u32)> {
        self.inner.lock().capture.as_ref().map(DesktopCapture::dimensions)
    }

    pub fn encode_frame(&self, idx: usize) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.encoder.is_none() {
            return Err(Error::InvalidEncoder);
        }
        if inner.fifo.is_full() {
            return Err(Error::QueueFull);
        }

        let resolved_idx = match inner.capture.as_mut() {
            Some(capture) => match capture.preprocess_frame()? {
                dopp::PreprocessResult::Idx(i) => i,
                dopp::PreprocessResult::NoUpdate => {
                    if !inner.fifo.is_empty() {
                        return Ok(());
                    }
                    return Err(Error::DoppNoUpdate);
                }
            },
            None => {
                if idx >= self.context.registered_count() {
                    return Err(Error::InvalidIndex);
                }
                idx
            }
        };

        let dst = inner.next_result;
        let encoder_csc = inner.encoder_csc;
        let encoder = inner.encoder.as_mut().expect("checked above");
        let (run_csc, kernel, format_tag) = if encoder_csc {
            Self::resolve_csc(encoder.preferred_format())
        } else {
            (false, CscKernel::CopyReorder, FORMAT_TAG_RGBA)
        };
        let flip = inner.settings.flip;

        self.context.process_buffer(resolved_idx, dst, run_csc, flip, kernel, format_tag)?;
        encoder.encode(dst, !run_csc)?;
        inner.fifo.push(dst).map_err(|_| Error::QueueFull)?;
        inner.next_result = (dst + 1) % crate::context::NUM_RESULTS;
        Ok(())
    }

    pub fn get_encoded_frame(&self) -> Result<EncodedFrame> {
        let mut inner = self.inner.lock();
        let encoder = inner.encoder.as_mut().ok_or(Error::InvalidEncoder)?;
        let frame = encoder.get_encoded_frame()?;
        inner.fifo.pop();
        Ok(frame)
    }

    pub fn get_source_frame(&self) -> Result<Vec<u8>> {
        let inner = self.inner.lock();
        let idx = inner.fifo.front().ok_or(Error::NoEncodedFrame)?;
        self.context.host_bytes(idx)
    }

    pub fn set_parameter(&self, name: u32, value: Value) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.params.set(name, value).map_err(|err| match err {
            crate::param::ParamSetError::Unknown => Error::InvalidSessionProperties,
            crate::param::ParamSetError::Denied => Error::ParamAccessDenied,
        })
    }

    pub fn get_parameter(&self, name: u32) -> Result<(Value, ParamState)> {
        let inner = self.inner.lock();
        let param = inner.params.get(name).ok_or(Error::InvalidSessionProperties)?;
        Ok((param.value(), param.state()))
    }

    pub fn set_encode_parameter(&self, name: u32, value: Value) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.encoder_settings.contains(name) {
            return Err(Error::InvalidEncoderParameter);
        }
        let encoder = inner.encoder.as_mut().ok_or(Error::InvalidEncoder)?;
        match encoder.set_parameter(name, value) {
            Ok(()) => {
                inner.encoder_settings.set_internal(name, value, ParamState::Ready);
                Ok(())
            }
            Err(Error::ParamAccessDenied) => {
                inner.log.event(&format!("encode parameter {name:#x} rejected: access denied"));
                Err(Error::ParamAccessDenied)
            }
            Err(err) => Err(err),
        }
    }

    pub fn get_encode_parameter(&self, name: u32) -> Result<(Value, ParamState)> {
        let inner = self.inner.lock();
        if !inner.encoder_settings.contains(name) {
            return Err(Error::InvalidEncoderParameter);
        }
        let param = inner.encoder_settings.get(name).expect("checked above");
        Ok((param.value(), param.state()))
    }

    /// Raw-`isize` variant of [`Self::set_parameter`], for the C API: the
    /// registered [`ParamType`] (not a tag in the wire value) decides how
    /// the bits are interpreted.
    pub fn set_parameter_raw(&self, name: u32, raw: isize) -> Result<()> {
        let value = self.inner.lock().params.value_from_raw(name, raw).ok_or(Error::InvalidSessionProperties)?;
        self.set_parameter(name, value)
    }

    pub fn get_parameter_raw(&self, name: u32) -> Result<(isize, ParamState)> {
        let (value, state) = self.get_parameter(name)?;
        Ok((value.to_raw(), state))
    }

    pub fn set_encode_parameter_raw(&self, name: u32, raw: isize) -> Result<()> {
        let value = self
            .inner
            .lock()
            .encoder_settings
            .value_from_raw(name, raw)
            .ok_or(Error::InvalidEncoderParameter)?;
        self.set_encode_parameter(name, value)
    }

    pub fn get_encode_parameter_raw(&self, name: u32) -> Result<(isize, ParamState)> {
        let (value, state) = self.get_encode_parameter(name)?;
        Ok((value.to_raw(), state))
    }

    pub fn resize(&self, width: u32, height: u32) -> Result<()> {
        let mut inner = self.inner.lock();
        let encoder = inner.encoder.as_mut().ok_or(Error::InvalidEncoder)?;
        if !encoder.is_resize_supported() {
            return Err(Error::InvalidConfig);
        }
        encoder.resize(width, height)?;
        self.context.resize_dimensions(width, height);
        self.context.create_result_buffers(encoder.preferred_format())?;
        if let Some(capture) = inner.capture.as_mut() {
            capture.resize(&self.context, width, height)?;
        }
        inner.width = width;
        inner.height = height;
        inner.fifo = BoundedFifo::new(crate::context::NUM_RESULTS);
        inner.next_result = 0;
        inner.log.event(&format!("resized to {width}x{height}"));
        Ok(())
    }

    pub fn release_event(&self, kind: NotificationKind) -> Result<()> {
        let inner = self.inner.lock();
        match inner.capture.as_ref() {
            Some(capture) => {
                capture.release_event(kind);
                Ok(())
            }
            None => Err(Error::Fail("session has no notification events".into())),
        }
    }

    pub fn get_mouse_data(&self, wait_for_shape_change: bool) -> Result<MouseData> {
        let mut inner = self.inner.lock();
        let mouse = inner.mouse.as_mut().ok_or_else(|| Error::Fail("session was not created with mouse data enabled".into()))?;
        mouse.query(wait_for_shape_change)
    }

    pub fn get_mouse_data2(&self, wait_for_shape_change: bool) -> Result<MouseData2> {
        let mut inner = self.inner.lock();
        let mouse = inner.mouse.as_mut().ok_or_else(|| Error::Fail("session was not created with mouse data enabled".into()))?;
        mouse.query2(wait_for_shape_change)
    }

    pub fn width(&self) -> u32 {
        self.inner.lock().width
    }

    pub fn height(&self) -> u32 {
        self.inner.lock().height
    }

    pub fn graphics_api(&self) -> GraphicsApi {
        self.api
    }
}

fn register_session_params(params: &mut ParamMap, settings: &SessionSettings) {
    params.register(rf::FLIP_SOURCE, ParamType::Bool, Value::Bool(settings.flip), [Value::Bool(settings.flip); 3], ParamState::Ready, false);
    params.register(
        rf::ASYNC_SOURCE_COPY,
        ParamType::Bool,
        Value::Bool(settings.async_copy),
        [Value::Bool(settings.async_copy); 3],
        ParamState::Ready,
        false,
    );
    params.register(
        rf::ENCODER_BLOCKING_READ,
        ParamType::Bool,
        Value::Bool(settings.blocking_read),
        [Value::Bool(settings.blocking_read); 3],
        ParamState::Ready,
        false,
    );
    params.register(
        rf::MOUSE_DATA,
        ParamType::Bool,
        Value::Bool(settings.mouse_data),
        [Value::Bool(settings.mouse_data); 3],
        ParamState::Blocked,
        true,
    );
}

/// Registers the encoder-parameter mirror with the defaults the AMF
/// wrapper's property table understands (`params::PROPERTY_NAME_MAP`) plus
/// the diff-encoder knobs and the read-only dimension parameters.
fn register_encoder_params(settings: &mut ParamMap, codec: AmfCodec) {
    use crate::encoder::amf::params::{HEVC_PROPERTY_NAME_MAP, PROPERTY_NAME_MAP};

    settings.register(rf::ENCODER_CODEC, ParamType::Int, Value::Int(0), [Value::Int(0); 3], ParamState::Ready, false);

    let property_map = match codec {
        AmfCodec::Avc => PROPERTY_NAME_MAP,
        AmfCodec::Hevc => HEVC_PROPERTY_NAME_MAP,
    };
    for entry in property_map {
        settings.register(entry.rf_name, ParamType::UInt, Value::UInt(0), [Value::UInt(0); 3], ParamState::Ready, false);
    }

    let presubmit_params = match codec {
        AmfCodec::Avc => crate::encoder::amf::params::PRESUBMIT_PARAMS,
        AmfCodec::Hevc => crate::encoder::amf::params::HEVC_PRESUBMIT_PARAMS,
    };
    for &name in presubmit_params {
        settings.register(name, ParamType::Bool, Value::Bool(false), [Value::Bool(false); 3], ParamState::Ready, false);
    }

    settings.register(rf::DIFF_BLOCK_S, ParamType::UInt, Value::UInt(16), [Value::UInt(16); 3], ParamState::Ready, false);
    settings.register(rf::DIFF_BLOCK_T, ParamType::UInt, Value::UInt(16), [Value::UInt(16); 3], ParamState::Ready, false);
    settings.register(rf::DIFF_LOCK_BUFFER, ParamType::Bool, Value::Bool(false), [Value::Bool(false); 3], ParamState::Ready, false);

    for &name in &[rf::ENCODER_WIDTH, rf::ENCODER_HEIGHT, rf::ENCODER_OUTPUT_WIDTH, rf::ENCODER_OUTPUT_HEIGHT] {
        settings.register(name, ParamType::UInt, Value::UInt(0), [Value::UInt(0); 3], ParamState::Blocked, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_identifier_rejects_more_than_one() {
        let props = [(rf::DESKTOP, Value::UInt(0)), (rf::DESKTOP_DSP_ID, Value::UInt(1))];
        assert!(matches!(desktop_identifier(&props), Err(Error::InvalidDesktopId)));
    }

    #[test]
    fn desktop_identifier_accepts_exactly_one() {
        let props = [(rf::DESKTOP_INTERNAL_DSP_ID, Value::UInt(2))];
        assert!(matches!(desktop_identifier(&props).unwrap(), Some(DesktopIdentifier::Internal(2))));
    }

    #[test]
    fn desktop_identifier_absent_is_none() {
        let props = [(rf::FLIP_SOURCE, Value::Bool(true))];
        assert!(desktop_identifier(&props).unwrap().is_none());
    }

    #[test]
    fn graphics_api_resolves_first_matching_property() {
        let props = [(rf::D3D11_DEVICE, Value::Ptr(0x1234))];
        assert_eq!(graphics_api(&props), GraphicsApi::D3D11);
    }

    #[test]
    fn graphics_api_defaults_to_none() {
        assert_eq!(graphics_api(&[]), GraphicsApi::None);
    }

    #[test]
    fn resolve_settings_reads_every_flag() {
        let props = [
            (rf::FLIP_SOURCE, Value::Bool(true)),
            (rf::ASYNC_SOURCE_COPY, Value::Bool(true)),
            (rf::ENCODER_BLOCKING_READ, Value::Bool(true)),
            (rf::MOUSE_DATA, Value::Bool(true)),
            (rf::ENCODER, Value::Int(2)),
        ];
        let settings = resolve_settings(&props).unwrap();
        assert!(settings.flip && settings.async_copy && settings.blocking_read && settings.mouse_data);
        assert_eq!(settings.encoder_kind, EncoderKind::Difference);
    }

    #[test]
    fn resolve_settings_rejects_unknown_encoder_kind() {
        let props = [(rf::ENCODER, Value::Int(99))];
        assert!(matches!(resolve_settings(&props), Err(Error::InvalidSessionProperties)));
    }

    #[test]
    fn encoder_kind_from_property_round_trips() {
        assert_eq!(EncoderKind::from_property(0), Some(EncoderKind::Amf));
        assert_eq!(EncoderKind::from_property(1), Some(EncoderKind::Identity));
        assert_eq!(EncoderKind::from_property(2), Some(EncoderKind::Difference));
        assert_eq!(EncoderKind::from_property(3), None);
    }

    #[test]
    fn register_encoder_params_marks_dimensions_read_only() {
        let mut settings = ParamMap::new();
        register_encoder_params(&mut settings, AmfCodec::Avc);
        for &name in &[rf::ENCODER_WIDTH, rf::ENCODER_HEIGHT, rf::ENCODER_OUTPUT_WIDTH, rf::ENCODER_OUTPUT_HEIGHT] {
            assert_eq!(settings.get(name).unwrap().state(), ParamState::Blocked);
            assert_eq!(settings.set(name, Value::UInt(1)), Err(crate::param::ParamSetError::Denied));
        }
    }

    #[test]
    fn register_encoder_params_selects_hevc_table_for_hevc_codec() {
        let mut settings = ParamMap::new();
        register_encoder_params(&mut settings, AmfCodec::Hevc);
        assert!(settings.contains(rf::ENCODER_HEVC_PROFILE));
        assert!(settings.contains(rf::ENCODER_HEVC_INSERT_HEADER));
        assert!(!settings.contains(rf::ENCODER_PROFILE));
        assert!(!settings.contains(rf::ENCODER_INSERT_SPS));
    }

    #[test]
    fn resolve_encoder_csc_is_false_only_for_plain_rgba8_no_capture_no_flip() {
        assert!(!Session::resolve_encoder_csc(false, false, PixelFormat::Rgba8));
        assert!(Session::resolve_encoder_csc(true, false, PixelFormat::Rgba8));
        assert!(Session::resolve_encoder_csc(false, true, PixelFormat::Rgba8));
        assert!(Session::resolve_encoder_csc(false, false, PixelFormat::Nv12));
        assert!(Session::resolve_encoder_csc(false, false, PixelFormat::Argb8));
        assert!(Session::resolve_encoder_csc(false, false, PixelFormat::Bgra8));
    }

    #[test]
    fn resolve_csc_picks_the_matching_kernel_and_format_tag() {
        assert_eq!(Session::resolve_csc(PixelFormat::Nv12), (true, CscKernel::RgbaToNv12Interleaved, 0));
        assert_eq!(Session::resolve_csc(PixelFormat::Rgba8), (true, CscKernel::CopyReorder, FORMAT_TAG_RGBA));
        assert_eq!(Session::resolve_csc(PixelFormat::Argb8), (true, CscKernel::CopyReorder, FORMAT_TAG_ARGB));
        assert_eq!(Session::resolve_csc(PixelFormat::Bgra8), (true, CscKernel::CopyReorder, FORMAT_TAG_BGRA));
    }

    #[test]
    fn resolve_amf_codec_reads_encoder_codec_property() {
        assert_eq!(Session::resolve_amf_codec(&[]), AmfCodec::Avc);
        assert_eq!(Session::resolve_amf_codec(&[(rf::ENCODER_CODEC, Value::Int(1))]), AmfCodec::Hevc);
        assert_eq!(Session::resolve_amf_codec(&[(rf::ENCODER_CODEC, Value::Int(0))]), AmfCodec::Avc);
    }

    #[test]
    fn register_session_params_blocks_mouse_data_after_creation() {
        let settings = SessionSettings { mouse_data: true, ..Default::default() };
        let mut params = ParamMap::new();
        register_session_params(&mut params, &settings);
        assert_eq!(params.get(rf::MOUSE_DATA).unwrap().state(), ParamState::Blocked);
        assert_eq!(params.set(rf::MOUSE_DATA, Value::Bool(false)), Err(crate::param::ParamSetError::Denied));
    }
}
