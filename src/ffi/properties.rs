//! Property/parameter name constants for the C API, transcribed from the
//! original `RFSessionParams`/`RFEncoderParams` enums (`RapidFire.h`). Kept
//! as flat `u32` constants rather than a Rust enum so [`crate::param::ParamMap`]
//! can key on them directly and the FFI boundary in [`super`] needs no
//! int-to-enum fallibility at all.

// Session properties.
pub const GL_GRAPHICS_CTX: u32 = 0x1001;
pub const GL_DEVICE_CTX: u32 = 0x1002;
pub const D3D9_DEVICE: u32 = 0x1003;
pub const D3D9EX_DEVICE: u32 = 0x1004;
pub const D3D11_DEVICE: u32 = 0x1005;
pub const DESKTOP: u32 = 0x1007;
pub const DESKTOP_DSP_ID: u32 = 0x1008;
pub const DESKTOP_UPDATE_ON_CHANGE: u32 = 0x1009;
pub const DESKTOP_BLOCK_UNTIL_CHANGE: u32 = 0x1010;
pub const FLIP_SOURCE: u32 = 0x1012;
pub const ASYNC_SOURCE_COPY: u32 = 0x1013;
pub const ENCODER: u32 = 0x1014;
pub const ENCODER_BLOCKING_READ: u32 = 0x1015;
pub const MOUSE_DATA: u32 = 0x1016;
pub const DESKTOP_INTERNAL_DSP_ID: u32 = 0x1017;

// AVC / common encoder parameters.
pub const ENCODER_CODEC: u32 = 0x1101;
pub const ENCODER_FORMAT: u32 = 0x1111;
pub const ENCODER_PROFILE: u32 = 0x1112;
pub const ENCODER_LEVEL: u32 = 0x1113;
pub const ENCODER_USAGE: u32 = 0x1114;
pub const ENCODER_COMMON_LOW_LATENCY_INTERNAL: u32 = 0x1115;

pub const ENCODER_BITRATE: u32 = 0x1121;
pub const ENCODER_PEAK_BITRATE: u32 = 0x1122;
pub const ENCODER_RATE_CONTROL_METHOD: u32 = 0x1123;
pub const ENCODER_MIN_QP: u32 = 0x1124;
pub const ENCODER_MAX_QP: u32 = 0x1125;
pub const ENCODER_VBV_BUFFER_SIZE: u32 = 0x1127;
pub const ENCODER_VBV_BUFFER_FULLNESS: u32 = 0x1128;
pub const ENCODER_ENFORCE_HRD: u32 = 0x1129;
pub const ENCODER_FRAME_RATE: u32 = 0x1130;
pub const ENCODER_FRAME_RATE_DEN: u32 = 0x1131;
pub const ENCODER_ENABLE_VBAQ: u32 = 0x1132;

pub const ENCODER_IDR_PERIOD: u32 = 0x1141;
pub const ENCODER_INTRA_REFRESH_NUM_MB: u32 = 0x1142;
pub const ENCODER_DEBLOCKING_FILTER: u32 = 0x1143;
pub const ENCODER_NUM_SLICES_PER_FRAME: u32 = 0x1144;
pub const ENCODER_QUALITY_PRESET: u32 = 0x1145;

pub const ENCODER_HALF_PIXEL: u32 = 0x1152;
pub const ENCODER_QUARTER_PIXEL: u32 = 0x1153;

pub const DIFF_BLOCK_S: u32 = 0x1154;
pub const DIFF_BLOCK_T: u32 = 0x1155;
pub const DIFF_LOCK_BUFFER: u32 = 0x1156;

// AVC pre-submit (per-frame) parameters.
pub const ENCODER_FORCE_INTRA_REFRESH: u32 = 0x1061;
pub const ENCODER_FORCE_I_FRAME: u32 = 0x1062;
pub const ENCODER_FORCE_P_FRAME: u32 = 0x1063;
pub const ENCODER_INSERT_SPS: u32 = 0x1064;
pub const ENCODER_INSERT_PPS: u32 = 0x1065;
pub const ENCODER_INSERT_AUD: u32 = 0x1066;

// HEVC encoding parameters.
pub const ENCODER_HEVC_USAGE: u32 = 0x1300;
pub const ENCODER_HEVC_PROFILE: u32 = 0x1301;
pub const ENCODER_HEVC_LEVEL: u32 = 0x1302;
pub const ENCODER_HEVC_TIER: u32 = 0x1303;

pub const ENCODER_HEVC_RATE_CONTROL_METHOD: u32 = 0x1305;
pub const ENCODER_HEVC_FRAMERATE: u32 = 0x1306;
pub const ENCODER_HEVC_FRAMERATE_DEN: u32 = 0x1307;
pub const ENCODER_HEVC_VBV_BUFFER_SIZE: u32 = 0x1308;
pub const ENCODER_HEVC_INITIAL_VBV_BUFFER_FULLNESS: u32 = 0x1309;
pub const ENCODER_HEVC_RATE_CONTROL_PREANALYSIS_ENABLE: u32 = 0x1310;
pub const ENCODER_HEVC_ENABLE_VBAQ: u32 = 0x1311;

pub const ENCODER_HEVC_TARGET_BITRATE: u32 = 0x1312;
pub const ENCODER_HEVC_PEAK_BITRATE: u32 = 0x1313;
pub const ENCODER_HEVC_MIN_QP_I: u32 = 0x1314;
pub const ENCODER_HEVC_MAX_QP_I: u32 = 0x1315;
pub const ENCODER_HEVC_MIN_QP_P: u32 = 0x1316;
pub const ENCODER_HEVC_MAX_QP_P: u32 = 0x1317;
pub const ENCODER_HEVC_QP_I: u32 = 0x1318;
pub const ENCODER_HEVC_QP_P: u32 = 0x1319;
pub const ENCODER_HEVC_ENFORCE_HRD: u32 = 0x1320;
pub const ENCODER_HEVC_MAX_AU_SIZE: u32 = 0x1321;
pub const ENCODER_HEVC_FILLER_DATA_ENABLE: u32 = 0x1322;
pub const ENCODER_HEVC_RATE_CONTROL_SKIP_FRAME_ENABLE: u32 = 0x1323;

pub const ENCODER_HEVC_HEADER_INSERTION_MODE: u32 = 0x1324;
pub const ENCODER_HEVC_GOP_SIZE: u32 = 0x1325;
pub const ENCODER_HEVC_NUM_GOPS_PER_IDR: u32 = 0x1326;
pub const ENCODER_HEVC_DE_BLOCKING_FILTER_DISABLE: u32 = 0x1327;
pub const ENCODER_HEVC_SLICES_PER_FRAME: u32 = 0x1328;

pub const ENCODER_HEVC_QUALITY_PRESET: u32 = 0x1329;

pub const ENCODER_HEVC_MOTION_HALF_PIXEL: u32 = 0x1330;
pub const ENCODER_HEVC_MOTION_QUARTERPIXEL: u32 = 0x1331;

// HEVC pre-submit (per-frame) parameters.
pub const ENCODER_HEVC_FORCE_INTRA_REFRESH: u32 = 0x1201;
pub const ENCODER_HEVC_FORCE_I_FRAME: u32 = 0x1202;
pub const ENCODER_HEVC_FORCE_P_FRAME: u32 = 0x1203;
pub const ENCODER_HEVC_INSERT_HEADER: u32 = 0x1204;
pub const ENCODER_HEVC_INSERT_AUD: u32 = 0x1205;

// Read-only parameters.
pub const ENCODER_WIDTH: u32 = 0x1081;
pub const ENCODER_HEIGHT: u32 = 0x1082;
pub const ENCODER_OUTPUT_WIDTH: u32 = 0x1083;
pub const ENCODER_OUTPUT_HEIGHT: u32 = 0x1084;

/// Classifies a property name's `intptr_t` encoding for the C API boundary,
/// where a raw property list carries no type tag of its own. Pointer-valued
/// session properties (native graphics handles) are `Ptr`; everything else
/// defaults to `UInt` unless it is one of the handful of booleans.
pub fn value_type(name: u32) -> crate::param::ParamType {
    use crate::param::ParamType;
    match name {
        GL_GRAPHICS_CTX | GL_DEVICE_CTX | D3D9_DEVICE | D3D9EX_DEVICE | D3D11_DEVICE => ParamType::Ptr,
        DESKTOP_UPDATE_ON_CHANGE
        | DESKTOP_BLOCK_UNTIL_CHANGE
        | FLIP_SOURCE
        | ASYNC_SOURCE_COPY
        | ENCODER_BLOCKING_READ
        | MOUSE_DATA
        | ENCODER_ENFORCE_HRD
        | ENCODER_ENABLE_VBAQ
        | ENCODER_HALF_PIXEL
        | ENCODER_QUARTER_PIXEL
        | DIFF_LOCK_BUFFER
        | ENCODER_FORCE_INTRA_REFRESH
        | ENCODER_FORCE_I_FRAME
        | ENCODER_FORCE_P_FRAME
        | ENCODER_INSERT_SPS
        | ENCODER_INSERT_PPS
        | ENCODER_INSERT_AUD
        | ENCODER_HEVC_ENABLE_VBAQ
        | ENCODER_HEVC_ENFORCE_HRD
        | ENCODER_HEVC_FILLER_DATA_ENABLE
        | ENCODER_HEVC_RATE_CONTROL_SKIP_FRAME_ENABLE
        | ENCODER_HEVC_DE_BLOCKING_FILTER_DISABLE
        | ENCODER_HEVC_MOTION_HALF_PIXEL
        | ENCODER_HEVC_MOTION_QUARTERPIXEL
        | ENCODER_HEVC_FORCE_INTRA_REFRESH
        | ENCODER_HEVC_FORCE_I_FRAME
        | ENCODER_HEVC_FORCE_P_FRAME
        | ENCODER_HEVC_INSERT_HEADER
        | ENCODER_HEVC_INSERT_AUD => ParamType::Bool,
        ENCODER_CODEC | ENCODER_PROFILE | ENCODER_LEVEL | ENCODER_USAGE | ENCODER_RATE_CONTROL_METHOD => ParamType::Int,
        _ => ParamType::UInt,
    }
}
