//! YOLO label encoding for sorter captures.
//!
//! Capture file names carry a pixel bounding box; YOLO label files want the
//! same box as center/size fractions of the image. This module owns that
//! conversion, the sensor resolution check that guards it, and the exact
//! text form of a label line.
//!
//! # Example
//!
//! ```
//! use brickset::label::{BBox, ClassId, LabelLine, Pixel, Resolution};
//!
//! let bbox = BBox::<Pixel>::from_capture(10, 20, 30, 40);
//! let line = LabelLine::encode(ClassId::new(0), &bbox, Resolution::new(640, 480));
//! assert_eq!(line.to_string(), "0 0.023 0.073 0.016 0.021");
//! ```

mod bbox;
mod ids;
mod space;

pub use bbox::BBox;
pub use ids::ClassId;
pub use space::{CoordSpace, Normalized, Pixel};

use std::fmt;
use std::path::Path;

use crate::error::BricksetError;

/// Width and height of an image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Fixed resolution of the sorter camera.
pub const SENSOR_RESOLUTION: Resolution = Resolution::new(640, 480);

/// Checks an image against the sensor resolution.
///
/// Only the pixel count is compared, so portrait captures (480x640) pass.
pub fn check_resolution(
    path: &Path,
    actual: Resolution,
    expected: Resolution,
) -> Result<(), BricksetError> {
    if actual.area() == expected.area() {
        Ok(())
    } else {
        Err(BricksetError::ResolutionMismatch {
            path: path.to_path_buf(),
            width: actual.width,
            height: actual.height,
            expected_width: expected.width,
            expected_height: expected.height,
        })
    }
}

/// Reads image dimensions from the file header without decoding pixels.
pub fn read_resolution(path: &Path) -> Result<Resolution, BricksetError> {
    let size = imagesize::size(path).map_err(|source| BricksetError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    // Oversized dimensions saturate and then fail the resolution check.
    let width = u32::try_from(size.width).unwrap_or(u32::MAX);
    let height = u32::try_from(size.height).unwrap_or(u32::MAX);

    Ok(Resolution::new(width, height))
}

/// Normalizes a capture box to `(center_x, center_y, width, height)`.
pub fn normalize(bbox: &BBox<Pixel>, resolution: Resolution) -> (f64, f64, f64, f64) {
    bbox.to_normalized(resolution.width as f64, resolution.height as f64)
        .to_cxcywh()
}

/// One line of a YOLO detection label file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelLine {
    pub class_id: ClassId,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl LabelLine {
    /// Encodes a capture box for an image of the given resolution.
    pub fn encode(class_id: ClassId, bbox: &BBox<Pixel>, resolution: Resolution) -> Self {
        let (cx, cy, w, h) = normalize(bbox, resolution);
        Self {
            class_id,
            cx,
            cy,
            w,
            h,
        }
    }

    /// Parses a label line as written by [`LabelLine`]'s `Display` impl.
    pub fn parse(line: &str, file_path: &Path) -> Result<Self, BricksetError> {
        // Take at most 6 tokens so pathological inputs do not allocate unbounded memory.
        let tokens: Vec<&str> = line.split_whitespace().take(6).collect();
        if tokens.len() != 5 {
            return Err(BricksetError::LabelParse {
                path: file_path.to_path_buf(),
                message: format!("expected 5 tokens, found {}", tokens.len()),
            });
        }

        let class_id = tokens[0]
            .parse::<usize>()
            .map_err(|_| BricksetError::LabelParse {
                path: file_path.to_path_buf(),
                message: format!(
                    "invalid class_id '{}'; expected non-negative integer",
                    tokens[0]
                ),
            })?;

        Ok(Self {
            class_id: ClassId::new(class_id),
            cx: parse_f64_token(tokens[1], "x_center", file_path)?,
            cy: parse_f64_token(tokens[2], "y_center", file_path)?,
            w: parse_f64_token(tokens[3], "width", file_path)?,
            h: parse_f64_token(tokens[4], "height", file_path)?,
        })
    }
}

impl fmt::Display for LabelLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.3} {:.3} {:.3} {:.3}",
            self.class_id, self.cx, self.cy, self.w, self.h
        )
    }
}

fn parse_f64_token(raw: &str, field_name: &str, file_path: &Path) -> Result<f64, BricksetError> {
    raw.parse::<f64>().map_err(|_| BricksetError::LabelParse {
        path: file_path.to_path_buf(),
        message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
    })
}
