use rapidcap::ffi::properties::{DIFF_BLOCK_S, DIFF_BLOCK_T, DIFF_LOCK_BUFFER, ENCODER_FRAME_RATE, ENCODER_FRAME_RATE_DEN};

#[test]
fn frame_rate_pair_is_adjacent() {
    assert_eq!(ENCODER_FRAME_RATE + 1, ENCODER_FRAME_RATE_DEN);
}

#[test]
fn diff_block_params_are_contiguous() {
    assert_eq!(DIFF_BLOCK_S + 1, DIFF_BLOCK_T);
    assert_eq!(DIFF_BLOCK_T + 1, DIFF_LOCK_BUFFER);
}
