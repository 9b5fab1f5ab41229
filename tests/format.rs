use rapidcap::format::{align_up, div_ceil};
use rapidcap::PixelFormat;

#[test]
fn nv12_frame_size_is_one_and_a_half_planes() {
    assert_eq!(PixelFormat::Nv12.frame_size(1920, 1080), 1920 * 1080 * 3 / 2);
}

#[test]
fn rgba_frame_size_is_four_bytes_per_pixel() {
    assert_eq!(PixelFormat::Rgba8.frame_size(640, 480), 640 * 480 * 4);
}

#[test]
fn align_up_rounds_to_multiple() {
    assert_eq!(align_up(17, 16), 32);
    assert_eq!(align_up(16, 16), 16);
    assert_eq!(align_up(1, 256), 256);
}

#[test]
fn div_ceil_matches_tile_grid_math() {
    assert_eq!(div_ceil(1920, 128), 15);
    assert_eq!(div_ceil(1080, 128), 9);
    assert_eq!(div_ceil(16, 16), 1);
}
