//! Fuzz target for capture file name parsing.
//!
//! Feeds arbitrary UTF-8 names to the timestamp and bounding-box parsers,
//! checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use brickset::capture::fuzz_parse_capture_name;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_parse_capture_name(name);
});
