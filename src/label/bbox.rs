//! Axis-aligned boxes stored as left/top/right/bottom edges.

use std::marker::PhantomData;

use super::{CoordSpace, Normalized, Pixel};

/// An axis-aligned bounding box given by its four edges.
///
/// The `TSpace` parameter is either [`Pixel`] or [`Normalized`]. Edge order
/// is not enforced; a capture with `right < left` still converts, it just
/// yields a negative width.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox<TSpace> {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBox<TSpace> {
    /// Creates a box from its edges.
    #[inline]
    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            _space: PhantomData,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Returns the box center as `(x, y)`.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Returns `(center_x, center_y, width, height)`.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        let (cx, cy) = self.center();
        (cx, cy, self.width(), self.height())
    }
}

impl<TSpace: CoordSpace> std::fmt::Debug for BBox<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBox")
            .field("space", &TSpace::NAME)
            .field("left", &self.left)
            .field("top", &self.top)
            .field("right", &self.right)
            .field("bottom", &self.bottom)
            .finish()
    }
}

impl BBox<Pixel> {
    /// Builds a pixel box from the integer edges found in a capture name.
    pub fn from_capture(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self::from_ltrb(left as f64, top as f64, right as f64, bottom as f64)
    }

    /// Scales the box into the unit square of an image.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBox<Normalized> {
        BBox::from_ltrb(
            self.left / image_width,
            self.top / image_height,
            self.right / image_width,
            self.bottom / image_height,
        )
    }
}

impl BBox<Normalized> {
    /// Rebuilds a normalized box from YOLO center/size values.
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::from_ltrb(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }
}
