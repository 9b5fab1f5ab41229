use rapidcap::session::mouse::{MouseData2, ShapeFlags};

#[test]
fn unrecognized_flag_combination_defaults_to_color() {
    let data = MouseData2 { flags: 0, ..Default::default() };
    assert_eq!(data.shape_flags(), ShapeFlags::COLOR);
}

#[test]
fn masked_color_flag_round_trips() {
    let data = MouseData2 {
        flags: ShapeFlags::MASKED_COLOR.bits(),
        ..Default::default()
    };
    assert_eq!(data.shape_flags(), ShapeFlags::MASKED_COLOR);
}
