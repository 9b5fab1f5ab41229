//! Opens a desktop-capture session against display 0 with the identity
//! encoder and dumps a handful of raw frames to disk, mirroring the
//! original SDK's `Samples/DesktopCapture`.

use rapidcap::ffi::properties as rf;
use rapidcap::{Preset, Session, Value};
use std::fs;
use std::path::PathBuf;

const FRAME_COUNT: usize = 5;

fn main() {
    env_logger::init();

    let properties = [
        (rf::DESKTOP, Value::UInt(0)),
        (rf::DESKTOP_BLOCK_UNTIL_CHANGE, Value::Bool(true)),
        (rf::ENCODER, Value::Int(1)), // identity
    ];

    let session = Session::create(&properties, PathBuf::from(".")).expect("failed to create desktop capture session");
    let (width, height) = session.capture_dimensions().expect("desktop session has no capture dimensions");
    log::info!("session {} created at {width}x{height}", session.id());

    session.create_encoder(width, height, Preset::Fast).expect("failed to create encoder");

    fs::create_dir_all("desktop_capture_frames").expect("failed to create output directory");

    for frame in 0..FRAME_COUNT {
        session.encode_frame(0).expect("encode_frame failed");
        let data = session.get_source_frame().expect("get_source_frame failed");
        let path = format!("desktop_capture_frames/frame_{frame:03}.rgba");
        fs::write(&path, &data).unwrap_or_else(|err| log::error!("failed to write {path}: {err}"));
        log::info!("wrote {path} ({} bytes)", data.len());
    }
}
