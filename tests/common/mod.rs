#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

#[path = "../../src/test_support.rs"]
mod fixtures;

pub use fixtures::{bmp_bytes, write_bmp};

/// Timestamp stamp `ms` milliseconds after 2023-05-23 10:00:00.000.
pub fn stamp(ms: u64) -> String {
    let hour = 10 + ms / 3_600_000;
    let minute = (ms / 60_000) % 60;
    let second = (ms / 1000) % 60;
    let milli = ms % 1000;
    format!("20230523_{hour:02}{minute:02}{second:02}{milli:03}")
}

/// Capture file name with the box the sorter writes for every frame.
pub fn capture_name(ms: u64) -> String {
    format!("{}_l10_r20_t30_b40_.jpg", stamp(ms))
}

/// Writes `passes` passes of `frames` 640x480 captures each.
///
/// Frames are 100 ms apart and passes start 2 s apart. Returns the stamps
/// of each pass.
pub fn write_passes(dir: &Path, passes: usize, frames: usize) -> Vec<Vec<String>> {
    (0..passes)
        .map(|pass| {
            (0..frames)
                .map(|frame| {
                    let ms = pass as u64 * 2000 + frame as u64 * 100;
                    write_bmp(&dir.join(capture_name(ms)), 640, 480);
                    stamp(ms)
                })
                .collect()
        })
        .collect()
}

/// Files directly inside `dir`, sorted by name.
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .map(|entry| entry.expect("read dir entry").path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}
