//! Box geometry for the VOC to YOLO conversion.
//!
//! Two box representations live here:
//!
//! 1. [`VocBox`]: absolute pixel coordinates as stored in a VOC `<bndbox>`.
//! 2. [`YoloBox`]: center/size coordinates normalized by the image size.
//!
//! Neither type enforces `min <= max` or image bounds. Malformed source boxes
//! pass through the normalization formula unchanged so that callers can treat
//! them as a data-quality signal instead of a conversion fault.
//!
//! # Example
//!
//! ```
//! use voc2yolo::geometry::{ImageSize, VocBox};
//!
//! let size = ImageSize::new(100, 200);
//! let source = VocBox::new(10.0, 30.0, 40.0, 80.0);
//! let yolo = source.normalize(size).expect("non-degenerate size");
//! assert_eq!((yolo.cx, yolo.cy, yolo.w, yolo.h), (0.2, 0.3, 0.2, 0.2));
//! ```

mod bbox;
mod size;

pub use bbox::{VocBox, YoloBox};
pub use size::{DegenerateSize, ImageSize};
