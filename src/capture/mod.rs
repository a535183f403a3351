//! Capture file-name parsing.
//!
//! The sorter camera names every frame after the moment it was taken and the
//! box the motion detector drew around the object:
//!
//! ```text
//! 20230523_105352366_l101_r377_t58_b411_w276_h353.jpg
//! ```
//!
//! The leading date and time fields (`YYYYMMDD_HHMMSSfff`, or the older
//! millisecond-less `YYYYMMDD_HHMMSS`) drive temporal clustering; the
//! `_l`/`_r`/`_t`/`_b` markers carry the pixel box. `_w`/`_h` repeat its
//! size; they are only read for box statistics.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::BricksetError;
use crate::label::{BBox, Pixel};

/// Capture moment of a frame, with the name prefix it was parsed from.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaptureTime {
    /// Parsed date and time at millisecond resolution.
    pub at: NaiveDateTime,
    /// The `YYYYMMDD_HHMMSS[fff]` prefix exactly as it appears in the name.
    pub stamp: String,
}

impl fmt::Display for CaptureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stamp)
    }
}

/// A scanned capture file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    pub path: PathBuf,
    pub captured: CaptureTime,
}

impl SourceImage {
    /// Builds a source image by parsing the timestamp from its file name.
    pub fn from_path(path: &Path) -> Result<Self, BricksetError> {
        let captured = parse_timestamp(&file_name(path))?;
        Ok(Self {
            path: path.to_path_buf(),
            captured,
        })
    }

    /// File name as a (lossy) string.
    pub fn name(&self) -> String {
        file_name(&self.path)
    }

    /// Directory holding the capture.
    pub fn class_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Parses the leading capture timestamp of a file name.
pub fn parse_timestamp(name: &str) -> Result<CaptureTime, BricksetError> {
    let mut fields = name.split(['_', '.']);
    let date = fields.next().unwrap_or_default();
    let time = fields.next().unwrap_or_default();

    if date.len() != 8 || !is_ascii_digits(date) {
        return Err(parse_error(name, format!("date field '{date}' is not YYYYMMDD")));
    }
    if !(time.len() == 9 || time.len() == 6) || !is_ascii_digits(time) {
        return Err(parse_error(
            name,
            format!("time field '{time}' is not HHMMSSfff or HHMMSS"),
        ));
    }

    let year = digits(&date[0..4]);
    let month = digits(&date[4..6]);
    let day = digits(&date[6..8]);
    let hour = digits(&time[0..2]);
    let minute = digits(&time[2..4]);
    let second = digits(&time[4..6]);
    let milli = if time.len() == 9 { digits(&time[6..9]) } else { 0 };

    let at = NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|d| d.and_hms_milli_opt(hour, minute, second, milli))
        .ok_or_else(|| parse_error(name, format!("'{date}_{time}' is not a valid date and time")))?;

    Ok(CaptureTime {
        at,
        stamp: format!("{date}_{time}"),
    })
}

/// Box markers a capture name may carry, in name order.
pub const BOX_MARKERS: [char; 6] = ['l', 'r', 't', 'b', 'w', 'h'];

static MARKER_PATTERNS: LazyLock<[(char, Regex); 6]> = LazyLock::new(|| {
    BOX_MARKERS.map(|marker| {
        let pattern = format!(r"_{marker}(\d+)(?:[_.]|$)");
        (marker, Regex::new(&pattern).expect("marker pattern is valid"))
    })
});

/// Reads the value of one `_{marker}{digits}` field of a file name.
pub fn parse_marker(name: &str, marker: char) -> Result<u32, BricksetError> {
    let regex = MARKER_PATTERNS
        .iter()
        .find(|(m, _)| *m == marker)
        .map(|(_, regex)| regex)
        .ok_or_else(|| parse_error(name, format!("unknown box marker '{marker}'")))?;
    let raw = regex
        .captures(name)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| parse_error(name, format!("missing _{marker}<digits> marker")))?;
    raw.as_str()
        .parse()
        .map_err(|_| parse_error(name, format!("_{marker} value '{}' is out of range", raw.as_str())))
}

/// Parses the `_l{L}_r{R}_t{T}_b{B}` pixel box of a file name.
pub fn parse_bbox(name: &str) -> Result<BBox<Pixel>, BricksetError> {
    let left = parse_marker(name, 'l')?;
    let right = parse_marker(name, 'r')?;
    let top = parse_marker(name, 't')?;
    let bottom = parse_marker(name, 'b')?;
    Ok(BBox::from_capture(left, right, top, bottom))
}

/// Fuzz-only entrypoint for capture name parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_capture_name(input: &str) -> Result<(), BricksetError> {
    let _ = parse_timestamp(input)?;
    let _ = parse_bbox(input)?;
    Ok(())
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_ascii_digits(raw: &str) -> bool {
    raw.bytes().all(|b| b.is_ascii_digit())
}

// Callers only pass short all-digit slices.
fn digits(raw: &str) -> u32 {
    raw.bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

fn parse_error(name: &str, message: String) -> BricksetError {
    BricksetError::FilenameParse {
        name: name.to_string(),
        message,
    }
}
