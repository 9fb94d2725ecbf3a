//! YOLO label file writer and reader.
//!
//! One record per line: `<class_id> <x_center> <y_center> <width> <height>`,
//! space separated, `\n` terminated, no header.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Voc2YoloError;
use crate::geometry::YoloBox;

/// One normalized box record in a label file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LabelRecord {
    pub class_id: usize,
    pub bbox: YoloBox,
}

impl LabelRecord {
    pub fn new(class_id: usize, bbox: YoloBox) -> Self {
        Self { class_id, bbox }
    }

    /// Renders the record as a single label line, without the line terminator.
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.class_id,
            format_value(self.bbox.cx),
            format_value(self.bbox.cy),
            format_value(self.bbox.w),
            format_value(self.bbox.h)
        )
    }
}

/// Renders records as label file contents. No records gives an empty string.
pub fn to_label_string(records: &[LabelRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_line());
        out.push('\n');
    }
    out
}

/// Creates or truncates `path` and writes `records` to it.
pub fn write_label_file(path: &Path, records: &[LabelRecord]) -> Result<(), Voc2YoloError> {
    fs::write(path, to_label_string(records)).map_err(Voc2YoloError::Io)
}

/// Reads every record of a label file. Blank lines are skipped.
pub fn read_label_file(path: &Path) -> Result<Vec<LabelRecord>, Voc2YoloError> {
    let content = fs::read_to_string(path).map_err(Voc2YoloError::Io)?;
    let mut records = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        if let Some(record) = parse_label_line(line, path, line_idx + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Parses a single `class cx cy w h` line written by this crate.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<LabelRecord>, Voc2YoloError> {
    let label_error = |message: String| Voc2YoloError::LabelParse {
        path: file_path.to_path_buf(),
        line: line_num,
        message,
    };

    // One field past the five we need is enough to tell the line is too long.
    let fields: Vec<&str> = line.split_whitespace().take(6).collect();
    let [class, cx, cy, w, h] = match fields.as_slice() {
        [] => return Ok(None),
        &[class, cx, cy, w, h] => [class, cx, cy, w, h],
        other if other.len() > 5 => {
            return Err(label_error(
                "more than 5 fields; expected `class cx cy w h`".to_string(),
            ))
        }
        other => {
            return Err(label_error(format!(
                "{} field(s); expected `class cx cy w h`",
                other.len()
            )))
        }
    };

    let class_id = class
        .parse::<usize>()
        .map_err(|_| label_error(format!("class id '{class}' is not a vocabulary index")))?;

    let mut values = [0.0; 4];
    for (slot, (field, raw)) in values
        .iter_mut()
        .zip([("cx", cx), ("cy", cy), ("w", w), ("h", h)])
    {
        *slot = raw
            .parse::<f64>()
            .map_err(|_| label_error(format!("{field} '{raw}' is not a number")))?;
    }
    let [cx, cy, w, h] = values;

    Ok(Some(LabelRecord::new(class_id, YoloBox::new(cx, cy, w, h))))
}

/// Shortest decimal form that round-trips, always with a fractional part
/// (`0.2`, `1.0`, `0.00005`).
fn format_value(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Fuzz-only entrypoint for single-line label parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), Voc2YoloError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}
