//! Static RF-parameter-name to vendor-property-name mapping.
//!
//! Grounded directly on `RFEncoderAMF.cpp`'s `g_PropertyNameMap`/
//! `g_HEVCPropertyNameMap` tables: each is a flat array of `(RF name, AMF
//! property name)` pairs, swapped in wholesale depending on the codec; this
//! crate turns them into two `const` slices plus a codec-aware lookup, and
//! adds the matching pre-submit sets (`FORCE_I_FRAME` etc.).

use crate::ffi::properties as rf;

/// AMF property name strings, as the vendor component's property store
/// expects them (mirrors the `AMF_VIDEO_ENCODER_*`/`AMF_VIDEO_ENCODER_HEVC_*`
/// constant names used by `RFEncoderAMF.cpp`).
pub mod amf_name {
    pub const PROFILE: &str = "ProfileAvc";
    pub const PROFILE_LEVEL: &str = "ProfileLevelAvc";
    pub const TARGET_BITRATE: &str = "TargetBitrate";
    pub const PEAK_BITRATE: &str = "PeakBitrate";
    pub const FRAMERATE: &str = "FrameRate";
    pub const RATE_CONTROL_METHOD: &str = "RateControlMethod";
    pub const MIN_QP: &str = "MinQP";
    pub const MAX_QP: &str = "MaxQP";
    pub const GOP_SIZE: &str = "GOPSize";
    pub const VBV_BUFFER_SIZE: &str = "VBVBufferSize";
    pub const VBV_BUFFER_FULLNESS: &str = "InitialVBVBufferFullness";
    pub const ENFORCE_HRD: &str = "EnforceHRD";
    pub const IDR_PERIOD: &str = "IDRPeriod";
    pub const INTRA_REFRESH_NUM_MBS: &str = "IntraRefreshNumMBsPerSlot";
    pub const DEBLOCKING_FILTER: &str = "DeBlockingFilter";
    pub const SLICES_PER_FRAME: &str = "SlicesPerFrame";
    pub const QUALITY_PRESET: &str = "QualityPreset";
    pub const HALF_PIXEL: &str = "MotionHalfPixel";
    pub const QUARTER_PIXEL: &str = "MotionQuarterPixel";
    pub const B_PIC_COUNT: &str = "BPicturesPattern";
    pub const USAGE: &str = "Usage";
}

/// HEVC counterparts of [`amf_name`], used when [`AmfCodec::Hevc`] swaps in
/// `g_HEVCPropertyNameMap`. HEVC keeps separate I/P QP pairs and a combined
/// VPS/SPS/PPS header insertion property instead of AVC's split SPS/PPS.
pub mod amf_name_hevc {
    pub const USAGE: &str = "UsageHevc";
    pub const PROFILE: &str = "ProfileHevc";
    pub const PROFILE_LEVEL: &str = "ProfileLevelHevc";
    pub const TIER: &str = "TierHevc";
    pub const RATE_CONTROL_METHOD: &str = "RateControlMethodHevc";
    pub const FRAMERATE: &str = "FrameRateHevc";
    pub const VBV_BUFFER_SIZE: &str = "VBVBufferSizeHevc";
    pub const VBV_BUFFER_FULLNESS: &str = "InitialVBVBufferFullnessHevc";
    pub const RATE_CONTROL_PREANALYSIS_ENABLE: &str = "RateControlPreAnalysisEnableHevc";
    pub const ENABLE_VBAQ: &str = "EnableVBAQHevc";
    pub const TARGET_BITRATE: &str = "TargetBitrateHevc";
    pub const PEAK_BITRATE: &str = "PeakBitrateHevc";
    pub const MIN_QP_I: &str = "MinQPIHevc";
    pub const MAX_QP_I: &str = "MaxQPIHevc";
    pub const MIN_QP_P: &str = "MinQPPHevc";
    pub const MAX_QP_P: &str = "MaxQPPHevc";
    pub const QP_I: &str = "QPIHevc";
    pub const QP_P: &str = "QPPHevc";
    pub const ENFORCE_HRD: &str = "EnforceHRDHevc";
    pub const MAX_AU_SIZE: &str = "MaxAUSizeHevc";
    pub const FILLER_DATA_ENABLE: &str = "FillerDataEnableHevc";
    pub const RATE_CONTROL_SKIP_FRAME_ENABLE: &str = "RateControlSkipFrameEnableHevc";
    pub const HEADER_INSERTION_MODE: &str = "HeaderInsertionModeHevc";
    pub const GOP_SIZE: &str = "GOPSizeHevc";
    pub const NUM_GOPS_PER_IDR: &str = "NumGOPsPerIdrHevc";
    pub const DEBLOCKING_FILTER_DISABLE: &str = "DeBlockingFilterDisableHevc";
    pub const SLICES_PER_FRAME: &str = "SlicesPerFrameHevc";
    pub const QUALITY_PRESET: &str = "QualityPresetHevc";
    pub const HALF_PIXEL: &str = "MotionHalfPixelHevc";
    pub const QUARTER_PIXEL: &str = "MotionQuarterPixelHevc";
}

/// Codec subcomponent an [`super::AmfEncoder`] wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmfCodec {
    Avc,
    Hevc,
}

/// One entry of the RF-name to vendor-name table.
#[derive(Debug, Clone, Copy)]
pub struct MappingEntry {
    pub rf_name: u32,
    pub amf_name: &'static str,
}

/// RF-name to AMF-name table, mirroring `g_PropertyNameMap`. Parameters not
/// in this table are rejected as `InvalidEncoderParameter`.
pub const PROPERTY_NAME_MAP: &[MappingEntry] = &[
    MappingEntry { rf_name: rf::ENCODER_PROFILE, amf_name: amf_name::PROFILE },
    MappingEntry { rf_name: rf::ENCODER_LEVEL, amf_name: amf_name::PROFILE_LEVEL },
    MappingEntry { rf_name: rf::ENCODER_BITRATE, amf_name: amf_name::TARGET_BITRATE },
    MappingEntry { rf_name: rf::ENCODER_PEAK_BITRATE, amf_name: amf_name::PEAK_BITRATE },
    MappingEntry { rf_name: rf::ENCODER_FRAME_RATE, amf_name: amf_name::FRAMERATE },
    MappingEntry { rf_name: rf::ENCODER_FRAME_RATE_DEN, amf_name: amf_name::FRAMERATE },
    MappingEntry { rf_name: rf::ENCODER_RATE_CONTROL_METHOD, amf_name: amf_name::RATE_CONTROL_METHOD },
    MappingEntry { rf_name: rf::ENCODER_MIN_QP, amf_name: amf_name::MIN_QP },
    MappingEntry { rf_name: rf::ENCODER_MAX_QP, amf_name: amf_name::MAX_QP },
    MappingEntry { rf_name: rf::ENCODER_GOP_SIZE, amf_name: amf_name::GOP_SIZE },
    MappingEntry { rf_name: rf::ENCODER_VBV_BUFFER_SIZE, amf_name: amf_name::VBV_BUFFER_SIZE },
    MappingEntry { rf_name: rf::ENCODER_VBV_BUFFER_FULLNESS, amf_name: amf_name::VBV_BUFFER_FULLNESS },
    MappingEntry { rf_name: rf::ENCODER_ENFORCE_HRD, amf_name: amf_name::ENFORCE_HRD },
    MappingEntry { rf_name: rf::ENCODER_IDR_PERIOD, amf_name: amf_name::IDR_PERIOD },
    MappingEntry { rf_name: rf::ENCODER_INTRA_REFRESH_NUM_MB, amf_name: amf_name::INTRA_REFRESH_NUM_MBS },
    MappingEntry { rf_name: rf::ENCODER_DEBLOCKING_FILTER, amf_name: amf_name::DEBLOCKING_FILTER },
    MappingEntry { rf_name: rf::ENCODER_NUM_SLICES_PER_FRAME, amf_name: amf_name::SLICES_PER_FRAME },
    MappingEntry { rf_name: rf::ENCODER_QUALITY_PRESET, amf_name: amf_name::QUALITY_PRESET },
    MappingEntry { rf_name: rf::ENCODER_HALF_PIXEL, amf_name: amf_name::HALF_PIXEL },
    MappingEntry { rf_name: rf::ENCODER_QUARTER_PIXEL, amf_name: amf_name::QUARTER_PIXEL },
];

/// HEVC-name to AMF-name table, mirroring `g_HEVCPropertyNameMap`. Swapped in
/// wholesale for [`AmfCodec::Hevc`] components in place of [`PROPERTY_NAME_MAP`];
/// HEVC has no counterpart for `ENCODER_INTRA_REFRESH_NUM_MB`, so that AVC
/// parameter is simply absent here, same as in the original table.
pub const HEVC_PROPERTY_NAME_MAP: &[MappingEntry] = &[
    MappingEntry { rf_name: rf::ENCODER_HEVC_USAGE, amf_name: amf_name_hevc::USAGE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_PROFILE, amf_name: amf_name_hevc::PROFILE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_LEVEL, amf_name: amf_name_hevc::PROFILE_LEVEL },
    MappingEntry { rf_name: rf::ENCODER_HEVC_TIER, amf_name: amf_name_hevc::TIER },
    MappingEntry { rf_name: rf::ENCODER_HEVC_RATE_CONTROL_METHOD, amf_name: amf_name_hevc::RATE_CONTROL_METHOD },
    MappingEntry { rf_name: rf::ENCODER_HEVC_FRAMERATE, amf_name: amf_name_hevc::FRAMERATE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_FRAMERATE_DEN, amf_name: amf_name_hevc::FRAMERATE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_VBV_BUFFER_SIZE, amf_name: amf_name_hevc::VBV_BUFFER_SIZE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_INITIAL_VBV_BUFFER_FULLNESS, amf_name: amf_name_hevc::VBV_BUFFER_FULLNESS },
    MappingEntry { rf_name: rf::ENCODER_HEVC_RATE_CONTROL_PREANALYSIS_ENABLE, amf_name: amf_name_hevc::RATE_CONTROL_PREANALYSIS_ENABLE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_ENABLE_VBAQ, amf_name: amf_name_hevc::ENABLE_VBAQ },
    MappingEntry { rf_name: rf::ENCODER_HEVC_TARGET_BITRATE, amf_name: amf_name_hevc::TARGET_BITRATE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_PEAK_BITRATE, amf_name: amf_name_hevc::PEAK_BITRATE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_MIN_QP_I, amf_name: amf_name_hevc::MIN_QP_I },
    MappingEntry { rf_name: rf::ENCODER_HEVC_MAX_QP_I, amf_name: amf_name_hevc::MAX_QP_I },
    MappingEntry { rf_name: rf::ENCODER_HEVC_MIN_QP_P, amf_name: amf_name_hevc::MIN_QP_P },
    MappingEntry { rf_name: rf::ENCODER_HEVC_MAX_QP_P, amf_name: amf_name_hevc::MAX_QP_P },
    MappingEntry { rf_name: rf::ENCODER_HEVC_QP_I, amf_name: amf_name_hevc::QP_I },
    MappingEntry { rf_name: rf::ENCODER_HEVC_QP_P, amf_name: amf_name_hevc::QP_P },
    MappingEntry { rf_name: rf::ENCODER_HEVC_ENFORCE_HRD, amf_name: amf_name_hevc::ENFORCE_HRD },
    MappingEntry { rf_name: rf::ENCODER_HEVC_MAX_AU_SIZE, amf_name: amf_name_hevc::MAX_AU_SIZE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_FILLER_DATA_ENABLE, amf_name: amf_name_hevc::FILLER_DATA_ENABLE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_RATE_CONTROL_SKIP_FRAME_ENABLE, amf_name: amf_name_hevc::RATE_CONTROL_SKIP_FRAME_ENABLE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_HEADER_INSERTION_MODE, amf_name: amf_name_hevc::HEADER_INSERTION_MODE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_GOP_SIZE, amf_name: amf_name_hevc::GOP_SIZE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_NUM_GOPS_PER_IDR, amf_name: amf_name_hevc::NUM_GOPS_PER_IDR },
    MappingEntry { rf_name: rf::ENCODER_HEVC_DE_BLOCKING_FILTER_DISABLE, amf_name: amf_name_hevc::DEBLOCKING_FILTER_DISABLE },
    MappingEntry { rf_name: rf::ENCODER_HEVC_SLICES_PER_FRAME, amf_name: amf_name_hevc::SLICES_PER_FRAME },
    MappingEntry { rf_name: rf::ENCODER_HEVC_QUALITY_PRESET, amf_name: amf_name_hevc::QUALITY_PRESET },
    MappingEntry { rf_name: rf::ENCODER_HEVC_MOTION_HALF_PIXEL, amf_name: amf_name_hevc::HALF_PIXEL },
    MappingEntry { rf_name: rf::ENCODER_HEVC_MOTION_QUARTERPIXEL, amf_name: amf_name_hevc::QUARTER_PIXEL },
];

/// Parameters whose semantics are per-frame: never applied directly, only
/// enqueued as a pre-submit override on the next surface.
pub const PRESUBMIT_PARAMS: &[u32] = &[
    rf::ENCODER_FORCE_I_FRAME,
    rf::ENCODER_FORCE_P_FRAME,
    rf::ENCODER_FORCE_INTRA_REFRESH,
    rf::ENCODER_INSERT_SPS,
    rf::ENCODER_INSERT_PPS,
    rf::ENCODER_INSERT_AUD,
];

/// HEVC pre-submit set: VPS/SPS/PPS collapse into one combined header insert.
pub const HEVC_PRESUBMIT_PARAMS: &[u32] = &[
    rf::ENCODER_HEVC_FORCE_I_FRAME,
    rf::ENCODER_HEVC_FORCE_P_FRAME,
    rf::ENCODER_HEVC_FORCE_INTRA_REFRESH,
    rf::ENCODER_HEVC_INSERT_HEADER,
    rf::ENCODER_HEVC_INSERT_AUD,
];

fn property_name_map(codec: AmfCodec) -> &'static [MappingEntry] {
    match codec {
        AmfCodec::Avc => PROPERTY_NAME_MAP,
        AmfCodec::Hevc => HEVC_PROPERTY_NAME_MAP,
    }
}

fn presubmit_params(codec: AmfCodec) -> &'static [u32] {
    match codec {
        AmfCodec::Avc => PRESUBMIT_PARAMS,
        AmfCodec::Hevc => HEVC_PRESUBMIT_PARAMS,
    }
}

pub fn is_presubmit(codec: AmfCodec, name: u32) -> bool {
    presubmit_params(codec).contains(&name)
}

pub fn lookup(codec: AmfCodec, name: u32) -> Option<&'static str> {
    property_name_map(codec).iter().find(|e| e.rf_name == name).map(|e| e.amf_name)
}
