//! Text preview of generated labels.
//!
//! Reads label files back, scales each record to the real image size and
//! renders pixel boxes with their class names. Useful for spot-checking a
//! converted split without an image viewer.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::convert::{read_label_file, LabelRecord};
use crate::error::Voc2YoloError;
use crate::geometry::ImageSize;
use crate::vocab::ClassVocabulary;

const IMAGE_EXTENSION: &str = "jpg";
const LABEL_EXTENSION: &str = "txt";

/// One image with its boxes in pixel corners.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewEntry {
    /// Image path relative to the images directory.
    pub image: String,
    pub size: ImageSize,
    pub boxes: Vec<PreviewBox>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PreviewBox {
    pub class_name: String,
    /// `[x1, y1, x2, y2]` in pixels.
    pub corners: [i64; 4],
}

impl fmt::Display for PreviewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}x{}): {} box(es)",
            self.image,
            self.size.width,
            self.size.height,
            self.boxes.len()
        )?;
        for b in &self.boxes {
            let [x1, y1, x2, y2] = b.corners;
            write!(f, "\n  {} [{}, {}, {}, {}]", b.class_name, x1, y1, x2, y2)?;
        }
        Ok(())
    }
}

/// Builds previews for up to `limit` images directly inside `images_dir`, in
/// file name order. Subdirectories are not descended into.
///
/// Images without a matching label file, or whose size cannot be read, are
/// skipped.
pub fn preview_labels(
    images_dir: &Path,
    labels_dir: &Path,
    vocab: &ClassVocabulary,
    limit: Option<usize>,
) -> Result<Vec<PreviewEntry>, Voc2YoloError> {
    let mut images = collect_images(images_dir)?;
    images.sort_by_cached_key(|path| rel_string(images_dir, path));

    let mut entries = Vec::new();
    for image_path in images {
        if limit.is_some_and(|limit| entries.len() >= limit) {
            break;
        }

        let rel = image_path
            .strip_prefix(images_dir)
            .unwrap_or(&image_path)
            .to_path_buf();
        let label_path = labels_dir.join(&rel).with_extension(LABEL_EXTENSION);
        if !label_path.is_file() {
            debug!("no label file for {}", image_path.display());
            continue;
        }

        let size = match read_image_size(&image_path) {
            Ok(size) => size,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };

        let boxes = read_label_file(&label_path)?
            .iter()
            .map(|record| preview_box(record, size, vocab))
            .collect();

        entries.push(PreviewEntry {
            image: rel_string(images_dir, &image_path),
            size,
            boxes,
        });
    }

    Ok(entries)
}

/// Reads an image's dimensions from its header.
pub fn read_image_size(path: &Path) -> Result<ImageSize, Voc2YoloError> {
    let size = imagesize::size(path).map_err(|source| Voc2YoloError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;
    let width = u32::try_from(size.width).unwrap_or(u32::MAX);
    let height = u32::try_from(size.height).unwrap_or(u32::MAX);
    Ok(ImageSize::new(width, height))
}

fn preview_box(record: &LabelRecord, size: ImageSize, vocab: &ClassVocabulary) -> PreviewBox {
    let class_name = vocab
        .name(record.class_id)
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| format!("class_{}", record.class_id));
    PreviewBox {
        class_name,
        corners: record.bbox.to_pixel_corners(size),
    }
}

fn collect_images(root: &Path) -> Result<Vec<PathBuf>, Voc2YoloError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| {
            Voc2YoloError::Io(std::io::Error::other(format!(
                "failed while traversing {}: {source}",
                root.display()
            )))
        })?;

        let is_image = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION));
        if entry.file_type().is_file() && is_image {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
