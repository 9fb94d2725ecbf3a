//! Pixel-space VOC boxes and normalized YOLO boxes.

use serde::Serialize;

use super::size::{DegenerateSize, ImageSize};

/// An axis-aligned box in absolute pixel coordinates, as read from a VOC `<bndbox>`.
///
/// Fields are consumed in the order `(xmin, xmax, ymin, ymax)`, which is NOT the
/// usual `(xmin, ymin, xmax, ymax)`. [`VocBox::new`] takes its arguments in that
/// same order; swapping `ymin` and `xmax` at a call site silently corrupts every
/// record without raising an error.
///
/// Ordering (`min <= max`) is not enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct VocBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl VocBox {
    /// Creates a box from coordinates in `(xmin, xmax, ymin, ymax)` order.
    #[inline]
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// May be negative if the box is malformed (xmax < xmin).
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// May be negative if the box is malformed (ymax < ymin).
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Returns true if min <= max on both axes.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }

    /// Normalizes this box against `size` into YOLO center/size form.
    ///
    /// ```text
    /// dw = 1 / width, dh = 1 / height
    /// cx = (xmin + xmax) / 2 * dw
    /// cy = (ymin + ymax) / 2 * dh
    /// w  = (xmax - xmin) * dw
    /// h  = (ymax - ymin) * dh
    /// ```
    ///
    /// The reciprocal-then-multiply order is kept so outputs match previously
    /// generated label files bit for bit.
    pub fn normalize(&self, size: ImageSize) -> Result<YoloBox, DegenerateSize> {
        Ok(self.normalize_by(size.reciprocal()?))
    }

    /// Same as [`normalize`](Self::normalize) with the factors from
    /// [`ImageSize::reciprocal`] already computed.
    pub fn normalize_by(&self, (dw, dh): (f64, f64)) -> YoloBox {
        let cx = (self.xmin + self.xmax) / 2.0;
        let cy = (self.ymin + self.ymax) / 2.0;
        YoloBox {
            cx: cx * dw,
            cy: cy * dh,
            w: self.width() * dw,
            h: self.height() * dh,
        }
    }
}

/// A box in YOLO form: center and size, normalized to the image dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct YoloBox {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl YoloBox {
    #[inline]
    pub fn new(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self { cx, cy, w, h }
    }

    /// Returns true if all four values lie in `[0, 1]`.
    pub fn is_within_unit(&self) -> bool {
        [self.cx, self.cy, self.w, self.h]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }

    /// Inverse of [`VocBox::normalize`]: scales back to pixel coordinates.
    pub fn to_voc(&self, size: ImageSize) -> VocBox {
        let width = size.width as f64;
        let height = size.height as f64;
        let cx = self.cx * width;
        let cy = self.cy * height;
        let half_w = self.w * width / 2.0;
        let half_h = self.h * height / 2.0;
        VocBox::new(cx - half_w, cx + half_w, cy - half_h, cy + half_h)
    }

    /// Integer pixel corners `[x1, y1, x2, y2]`, truncated toward zero.
    pub fn to_pixel_corners(&self, size: ImageSize) -> [i64; 4] {
        let width = size.width as f64;
        let height = size.height as f64;
        [
            ((self.cx - self.w / 2.0) * width) as i64,
            ((self.cy - self.h / 2.0) * height) as i64,
            ((self.cx + self.w / 2.0) * width) as i64,
            ((self.cy + self.h / 2.0) * height) as i64,
        ]
    }
}
