//! Report types for dataset assembly.

use serde::Serialize;
use std::fmt;

use super::Split;
use crate::convert::ConvertSummary;

/// Outcome of assembling one split across all sources.
#[derive(Clone, Debug, Serialize)]
pub struct AssembleReport {
    pub split: Split,
    pub sources: Vec<SourceReport>,
    /// Object-level totals over every converted annotation.
    pub labels: ConvertSummary,
}

/// Per-source counts for one split.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub name: String,
    /// False when the split manifest was missing and the source was skipped.
    pub manifest_found: bool,
    /// Image ids listed in the manifest.
    pub listed: usize,
    /// Image/annotation pairs copied and converted.
    pub processed: usize,
    /// Ids skipped because the image or the annotation file was absent.
    pub skipped_missing: usize,
}

impl SourceReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl AssembleReport {
    pub fn new(split: Split) -> Self {
        Self {
            split,
            sources: Vec::new(),
            labels: ConvertSummary::default(),
        }
    }

    /// Total image/annotation pairs processed across sources.
    pub fn processed(&self) -> usize {
        self.sources.iter().map(|s| s.processed).sum()
    }

    pub fn skipped_missing(&self) -> usize {
        self.sources.iter().map(|s| s.skipped_missing).sum()
    }

    /// Names of sources skipped for lack of a manifest.
    pub fn skipped_sources(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .filter(|s| !s.manifest_found)
            .map(|s| s.name.as_str())
    }
}

impl fmt::Display for AssembleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} set is ready with {} images.",
            self.split,
            self.processed()
        )?;

        for source in &self.sources {
            if source.manifest_found {
                writeln!(
                    f,
                    "  {}: {} listed, {} processed, {} skipped (missing files)",
                    source.name, source.listed, source.processed, source.skipped_missing
                )?;
            } else {
                writeln!(f, "  {}: skipped (no {}.txt manifest)", source.name, self.split)?;
            }
        }

        write!(
            f,
            "  {} label record(s) written; dropped {} difficult and {} out-of-vocabulary object(s)",
            self.labels.records, self.labels.skipped_difficult, self.labels.skipped_unknown_class
        )?;

        if self.labels.unordered_boxes + self.labels.out_of_range > 0 {
            write!(
                f,
                "\n  warning: {} box(es) with min > max, {} outside the image",
                self.labels.unordered_boxes, self.labels.out_of_range
            )?;
        }
        Ok(())
    }
}
