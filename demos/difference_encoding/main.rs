//! Opens a desktop-capture session with the tiled difference encoder and
//! prints the fraction of changed tiles per frame, mirroring the original
//! SDK's `Samples/DifferenceEncoding`.

use rapidcap::ffi::properties as rf;
use rapidcap::{Preset, Session, Value};
use std::path::PathBuf;

const FRAME_COUNT: usize = 30;

fn main() {
    env_logger::init();

    let properties = [
        (rf::DESKTOP, Value::UInt(0)),
        (rf::DESKTOP_BLOCK_UNTIL_CHANGE, Value::Bool(true)),
        (rf::ENCODER, Value::Int(2)), // difference
    ];

    let session = Session::create(&properties, PathBuf::from(".")).expect("failed to create desktop capture session");
    let (width, height) = session.capture_dimensions().expect("desktop session has no capture dimensions");
    log::info!("session {} created at {width}x{height}", session.id());

    session.create_encoder(width, height, Preset::Fast).expect("failed to create encoder");

    for frame in 0..FRAME_COUNT {
        session.encode_frame(0).expect("encode_frame failed");
        let encoded = session.get_encoded_frame().expect("get_encoded_frame failed");
        let changed = encoded.data.iter().filter(|&&tile| tile != 0).count();
        let total = encoded.data.len().max(1);
        let pct = 100.0 * changed as f64 / total as f64;
        log::info!("frame {frame}: {changed}/{total} tiles changed ({pct:.1}%)");
    }
}
