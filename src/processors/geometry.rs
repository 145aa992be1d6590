//! Geometric primitives for detection postprocessing.
//!
//! Field detections are axis-aligned boxes in source-image pixel
//! coordinates. Rotating the document by a multiple of 90° does not map
//! an axis-aligned box onto another one directly, so rotation tracks
//! the four corners explicitly and re-encloses them afterwards.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box, `(x_min, y_min)` inclusive top-left to
/// `(x_max, y_max)` exclusive bottom-right, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BBox {
    /// Creates a new bounding box from corner coordinates.
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// The four corners: top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.x_min, self.y_min),
            (self.x_max, self.y_min),
            (self.x_min, self.y_max),
            (self.x_max, self.y_max),
        ]
    }

    /// The smallest axis-aligned box enclosing the given points.
    pub fn enclosing(points: &[(f32, f32)]) -> Self {
        let mut x_min = f32::INFINITY;
        let mut y_min = f32::INFINITY;
        let mut x_max = f32::NEG_INFINITY;
        let mut y_max = f32::NEG_INFINITY;
        for &(x, y) in points {
            x_min = x_min.min(x);
            y_min = y_min.min(y);
            x_max = x_max.max(x);
            y_max = y_max.max(y);
        }
        Self::new(x_min, y_min, x_max, y_max)
    }

    /// Clamps the box to `[0, width] × [0, height]`.
    pub fn clamp(&self, width: f32, height: f32) -> Self {
        Self::new(
            self.x_min.clamp(0.0, width),
            self.y_min.clamp(0.0, height),
            self.x_max.clamp(0.0, width),
            self.y_max.clamp(0.0, height),
        )
    }

    /// Rotates the box together with an image of size `img_width × img_height`
    /// by `angle` degrees counter-clockwise about the image center.
    ///
    /// The corners are rotated individually and the result is the
    /// axis-aligned rectangle enclosing them, translated into the rotated
    /// image's coordinate system (the rotated canvas swaps width and
    /// height for 90°/270°).
    pub fn rotate(&self, angle: u32, img_width: u32, img_height: u32) -> Self {
        if angle % 360 == 0 {
            return *self;
        }

        let cx = (img_width / 2) as f32;
        let cy = (img_height / 2) as f32;
        let theta = (angle as f32).to_radians();
        let (sin, cos) = theta.sin_cos();

        let new_width = (img_height as f32 * sin.abs() + img_width as f32 * cos.abs()).round();
        let new_height = (img_height as f32 * cos.abs() + img_width as f32 * sin.abs()).round();

        // Rotation about (cx, cy) plus translation onto the resized canvas.
        let tx = (1.0 - cos) * cx - sin * cy + new_width / 2.0 - cx;
        let ty = sin * cx + (1.0 - cos) * cy + new_height / 2.0 - cy;

        let rotated: Vec<(f32, f32)> = self
            .corners()
            .iter()
            .map(|&(x, y)| (cos * x + sin * y + tx, -sin * x + cos * y + ty))
            .collect();

        Self::enclosing(&rotated)
    }

    /// Integer crop rectangle `(x, y, width, height)` within an image of the
    /// given dimensions, or `None` when the box has no interior pixels.
    pub fn crop_region(&self, img_width: u32, img_height: u32) -> Option<(u32, u32, u32, u32)> {
        let x1 = (self.x_min.max(0.0) as u32).min(img_width);
        let y1 = (self.y_min.max(0.0) as u32).min(img_height);
        let x2 = (self.x_max.ceil().max(0.0) as u32).min(img_width);
        let y2 = (self.y_max.ceil().max(0.0) as u32).min(img_height);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some((x1, y1, x2 - x1, y2 - y1))
    }
}
