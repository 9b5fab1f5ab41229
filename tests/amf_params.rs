use rapidcap::encoder::amf::params::{
    lookup, AmfCodec, HEVC_PRESUBMIT_PARAMS, HEVC_PROPERTY_NAME_MAP, PRESUBMIT_PARAMS, PROPERTY_NAME_MAP,
};
use rapidcap::ffi::properties as rf;

#[test]
fn no_duplicate_rf_names() {
    for table in [PROPERTY_NAME_MAP, HEVC_PROPERTY_NAME_MAP] {
        let mut names: Vec<u32> = table.iter().map(|e| e.rf_name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }
}

#[test]
fn every_avc_entry_resolves() {
    for entry in PROPERTY_NAME_MAP {
        assert_eq!(lookup(AmfCodec::Avc, entry.rf_name), Some(entry.amf_name));
    }
}

#[test]
fn every_hevc_entry_resolves() {
    for entry in HEVC_PROPERTY_NAME_MAP {
        assert_eq!(lookup(AmfCodec::Hevc, entry.rf_name), Some(entry.amf_name));
    }
}

#[test]
fn presubmit_params_are_not_in_the_apply_table() {
    for &name in PRESUBMIT_PARAMS {
        assert!(lookup(AmfCodec::Avc, name).is_none());
    }
    for &name in HEVC_PRESUBMIT_PARAMS {
        assert!(lookup(AmfCodec::Hevc, name).is_none());
    }
}

#[test]
fn frame_rate_and_frame_rate_den_share_one_amf_property() {
    assert_eq!(lookup(AmfCodec::Avc, rf::ENCODER_FRAME_RATE), lookup(AmfCodec::Avc, rf::ENCODER_FRAME_RATE_DEN));
    assert_eq!(
        lookup(AmfCodec::Hevc, rf::ENCODER_HEVC_FRAMERATE),
        lookup(AmfCodec::Hevc, rf::ENCODER_HEVC_FRAMERATE_DEN)
    );
}

#[test]
fn hevc_table_has_no_intra_refresh_num_mb_counterpart() {
    assert!(lookup(AmfCodec::Hevc, rf::ENCODER_INTRA_REFRESH_NUM_MB).is_none());
}
