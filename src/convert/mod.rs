//! VOC XML to YOLO label conversion.
//!
//! [`convert_objects`] is the core routine: it filters the objects of one
//! annotation and normalizes the survivors. [`convert_annotation`] wraps it
//! with file I/O. An object is dropped when either
//!
//! - its `<difficult>` flag equals 1, or
//! - its label is not in the [`ClassVocabulary`].
//!
//! Both checks run before the object's `<bndbox>` is read, and surviving
//! records keep document order.

mod voc_xml;
mod yolo_txt;

pub use voc_xml::{
    from_voc_xml_slice, parse_voc_annotation_str, read_voc_annotation, VocAnnotation, VocObject,
};
pub use yolo_txt::{
    parse_label_line, read_label_file, to_label_string, write_label_file, LabelRecord,
};

#[cfg(feature = "fuzzing")]
pub use yolo_txt::fuzz_parse_label_line;

use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::error::Voc2YoloError;
use crate::vocab::ClassVocabulary;

/// Per-file outcome of a conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConvertSummary {
    /// Records emitted.
    pub records: usize,
    /// Objects dropped because `<difficult>` was 1.
    pub skipped_difficult: usize,
    /// Objects dropped because their label is not in the vocabulary.
    pub skipped_unknown_class: usize,
    /// Emitted records whose source box has `min > max` on some axis.
    pub unordered_boxes: usize,
    /// Emitted records with a normalized value outside `[0, 1]`.
    pub out_of_range: usize,
}

impl ConvertSummary {
    pub fn merge(&mut self, other: &ConvertSummary) {
        self.records += other.records;
        self.skipped_difficult += other.skipped_difficult;
        self.skipped_unknown_class += other.skipped_unknown_class;
        self.unordered_boxes += other.unordered_boxes;
        self.out_of_range += other.out_of_range;
    }
}

/// Converts the objects of one parsed annotation into label records.
///
/// Fails with [`Voc2YoloError::InvalidGeometry`] when the image size has a zero
/// dimension, even if no object would have qualified. Malformed boxes are
/// converted as-is and only counted in the summary.
pub fn convert_objects(
    annotation: &VocAnnotation,
    vocab: &ClassVocabulary,
    path: &Path,
) -> Result<(Vec<LabelRecord>, ConvertSummary), Voc2YoloError> {
    let size = annotation.size;
    let scale = size
        .reciprocal()
        .map_err(|_| Voc2YoloError::InvalidGeometry {
            path: path.to_path_buf(),
            width: size.width,
            height: size.height,
        })?;

    let mut records = Vec::with_capacity(annotation.objects.len());
    let mut summary = ConvertSummary::default();

    for object in &annotation.objects {
        if object.is_difficult() {
            summary.skipped_difficult += 1;
            continue;
        }

        // Exact match: an empty or padded label is simply out of vocabulary.
        let name = object.required_name(path)?;
        let Some(class_id) = vocab.class_id(name) else {
            summary.skipped_unknown_class += 1;
            continue;
        };

        let source = object.bbox(path)?;
        let bbox = source.normalize_by(scale);
        if !source.is_ordered() {
            summary.unordered_boxes += 1;
        }
        if !bbox.is_within_unit() {
            summary.out_of_range += 1;
        }

        records.push(LabelRecord::new(class_id, bbox));
    }

    if summary.unordered_boxes + summary.out_of_range > 0 {
        debug!(
            "{}: {} unordered and {} out-of-range box(es) kept as-is",
            path.display(),
            summary.unordered_boxes,
            summary.out_of_range
        );
    }

    summary.records = records.len();
    Ok((records, summary))
}

/// Parses VOC XML from a string and converts it into label records.
pub fn convert_voc_str(
    xml: &str,
    vocab: &ClassVocabulary,
) -> Result<Vec<LabelRecord>, Voc2YoloError> {
    let path = Path::new("<memory>");
    let annotation = parse_voc_annotation_str(xml, path)?;
    let (records, _) = convert_objects(&annotation, vocab, path)?;
    Ok(records)
}

/// Converts one VOC XML file into one YOLO label file.
///
/// The label file is created or overwritten only after the whole document has
/// converted successfully, so a failure never leaves a partial file behind.
pub fn convert_annotation(
    xml_path: &Path,
    out_path: &Path,
    vocab: &ClassVocabulary,
) -> Result<ConvertSummary, Voc2YoloError> {
    let annotation = read_voc_annotation(xml_path)?;
    let (records, summary) = convert_objects(&annotation, vocab, xml_path)?;
    write_label_file(out_path, &records)?;
    Ok(summary)
}
