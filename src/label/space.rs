//! Coordinate spaces of capture boxes.
//!
//! A capture name carries its box as integer pixel edges (`_l`, `_r`, `_t`,
//! `_b`) measured from the top-left corner of the 640x480 frame. A YOLO
//! label holds the same box divided by the frame size. The two meet in
//! exactly one place, [`BBox::to_normalized`](super::BBox::to_normalized),
//! and the uninhabited markers below make any other mixing a type error.

/// A coordinate space a [`BBox`](super::BBox) can live in.
pub trait CoordSpace {
    /// Short name shown in debug output.
    const NAME: &'static str;
}

/// Pixel edges as written into capture file names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Edges divided by the frame size, as written into label files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl CoordSpace for Pixel {
    const NAME: &'static str = "pixel";
}

impl CoordSpace for Normalized {
    const NAME: &'static str = "normalized";
}
