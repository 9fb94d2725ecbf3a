//! Image dimensions, the source of normalization.

use serde::Serialize;
use std::fmt;

/// Width and height of an image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Returned when an image size cannot be used to normalize coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DegenerateSize(pub ImageSize);

impl fmt::Display for DegenerateSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "image size {}x{} has a zero dimension",
            self.0.width, self.0.height
        )
    }
}

impl std::error::Error for DegenerateSize {}

impl ImageSize {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Reciprocal scale factors `(1 / width, 1 / height)`.
    ///
    /// Fails instead of producing infinite factors for a zero dimension.
    pub fn reciprocal(&self) -> Result<(f64, f64), DegenerateSize> {
        if self.is_degenerate() {
            return Err(DegenerateSize(*self));
        }
        Ok((1.0 / self.width as f64, 1.0 / self.height as f64))
    }
}
