//! Per-session file log, mirroring the original `RF_LOG_PATH`/`RFError`
//! pair. Orthogonal to the `log` facade used
//! everywhere else in the crate: this is written directly by
//! [`crate::session::Session`] because it is scoped per-session rather
//! than per-process.

use once_cell::sync::OnceCell;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);
static CLEANED: OnceCell<()> = OnceCell::new();

pub fn next_session_id() -> u64 {
    NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)
}

/// Crude numeric thread identifier: stable Rust exposes `ThreadId` only as
/// an opaque `Debug`-able value, so this extracts its digits rather than
/// inventing a thread-local counter that wouldn't match across threads.
fn thread_id_numeric() -> u64 {
    let debug = format!("{:?}", std::thread::current().id());
    debug.chars().filter(|c| c.is_ascii_digit()).collect::<String>().parse().unwrap_or(0)
}

fn cleanup_old_logs(dir: &std::path::Path) {
    CLEANED.get_or_init(|| {
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    if name.starts_with("rapidcap_session_") && name.ends_with(".log") {
                        let _ = fs::remove_file(entry.path());
                    }
                }
            }
        }
    });
}

/// Appends one line per significant lifecycle event to
/// `rapidcap_session_<id>_<tid>.log` in `RAPIDCAP_LOG_PATH`, if set.
pub struct SessionLog {
    file: Option<File>,
}

impl SessionLog {
    /// Opens (or no-ops if `RAPIDCAP_LOG_PATH` is unset) the log file for
    /// `session_id`. Removes any pre-existing session log files in that
    /// directory the first time a process opens one.
    pub fn open(session_id: u64) -> Self {
        let Ok(dir) = std::env::var("RAPIDCAP_LOG_PATH") else {
            return Self { file: None };
        };
        let dir = PathBuf::from(dir);
        cleanup_old_logs(&dir);
        let path = dir.join(format!("rapidcap_session_{session_id}_{}.log", thread_id_numeric()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| log::warn!("failed to open session log {}: {err}", path.display()))
            .ok();
        Self { file }
    }

    pub fn event(&mut self, message: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let epoch = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64();
        if let Err(err) = writeln!(file, "[{epoch:.3}] {message}") {
            log::warn!("failed to write session log entry: {err}");
        }
    }
}
