use rapidcap::format::div_ceil;

fn cpu_reference_diff(current: &[u8], previous: &[u8], width: u32, height: u32, block_s: u32, block_t: u32) -> Vec<u8> {
    let tiles_x = div_ceil(width, block_s);
    let tiles_y = div_ceil(height, block_t);
    let mut out = vec![0u8; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut differs = false;
            'scan: for y in (ty * block_t)..((ty + 1) * block_t).min(height) {
                for x in (tx * block_s)..((tx + 1) * block_s).min(width) {
                    let idx = (y * width + x) as usize;
                    if current[idx] != previous[idx] {
                        differs = true;
                        break 'scan;
                    }
                }
            }
            out[(ty * tiles_x + tx) as usize] = differs as u8;
        }
    }
    out
}

#[test]
fn identical_frames_produce_all_zero_diff() {
    let frame = vec![7u8; 32 * 32];
    let diff = cpu_reference_diff(&frame, &frame, 32, 32, 16, 16);
    assert!(diff.iter().all(|&b| b == 0));
}

#[test]
fn single_pixel_change_marks_one_tile() {
    let mut current = vec![0u8; 32 * 32];
    let previous = vec![0u8; 32 * 32];
    current[17 * 32 + 17] = 1;
    let diff = cpu_reference_diff(&current, &previous, 32, 32, 16, 16);
    // Tile (1,1) covers x,y in [16,32); the lone change must land there.
    assert_eq!(diff, vec![0, 0, 0, 1]);
}

#[test]
fn tile_grid_dimensions_match_ceil_division() {
    assert_eq!(div_ceil(1920, 128), 15);
    assert_eq!(div_ceil(1080, 128), 9);
}
