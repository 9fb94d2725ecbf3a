//! Dataset assembly: VOC sources in, split-organized YOLO tree out.
//!
//! For a split, every source's `ImageSets/{split}.txt` manifest is read and
//! each listed id is copied and converted:
//!
//! ```text
//! {root}/JPEGImages/{id}.jpg   -> {out}/images/{split}/{source}_{id}.jpg
//! {root}/Annotations/{id}.xml  -> {out}/labels/{split}/{source}_{id}.txt
//! ```
//!
//! Whether a missing manifest, image or annotation is skipped or fatal is
//! controlled by [`AssembleOptions::strict`].

mod report;

pub use report::{AssembleReport, SourceReport};

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::SourceConfig;
use crate::convert::convert_annotation;
use crate::error::Voc2YoloError;
use crate::vocab::ClassVocabulary;

const IMAGE_EXTENSION: &str = "jpg";
const ANNOTATION_EXTENSION: &str = "xml";
const LABEL_EXTENSION: &str = "txt";
const MANIFEST_EXTENSION: &str = "txt";

/// A dataset partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = Voc2YoloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "val" => Ok(Split::Val),
            "test" => Ok(Split::Test),
            other => Err(Voc2YoloError::UnsupportedFormat(format!(
                "split '{other}' (supported: train, val, test)"
            ))),
        }
    }
}

/// Options for [`assemble_split`].
#[derive(Clone, Debug)]
pub struct AssembleOptions {
    pub output_dir: PathBuf,
    pub sources: Vec<SourceConfig>,
    /// If true, missing manifests and missing image/annotation files are errors.
    pub strict: bool,
}

/// Paths inside the output tree.
#[derive(Clone, Debug)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn images_dir(&self, split: Split) -> PathBuf {
        self.root.join("images").join(split.as_str())
    }

    pub fn labels_dir(&self, split: Split) -> PathBuf {
        self.root.join("labels").join(split.as_str())
    }

    /// Destination image path; the source prefix keeps ids from different
    /// sources from colliding.
    pub fn image_path(&self, split: Split, source: &str, image_id: &str) -> PathBuf {
        self.images_dir(split)
            .join(prefixed_file_name(source, image_id, IMAGE_EXTENSION))
    }

    pub fn label_path(&self, split: Split, source: &str, image_id: &str) -> PathBuf {
        self.labels_dir(split)
            .join(prefixed_file_name(source, image_id, LABEL_EXTENSION))
    }
}

/// Input paths inside one VOC source root.
struct SourceLayout<'a> {
    root: &'a Path,
}

impl SourceLayout<'_> {
    fn manifest(&self, split: Split) -> PathBuf {
        self.root
            .join("ImageSets")
            .join(format!("{}.{MANIFEST_EXTENSION}", split.as_str()))
    }

    fn image(&self, image_id: &str) -> PathBuf {
        self.root
            .join("JPEGImages")
            .join(format!("{image_id}.{IMAGE_EXTENSION}"))
    }

    fn annotation(&self, image_id: &str) -> PathBuf {
        self.root
            .join("Annotations")
            .join(format!("{image_id}.{ANNOTATION_EXTENSION}"))
    }
}

/// Builds one split of the output dataset from every configured source.
///
/// Output directories are created even when no pair is processed. Conversion
/// errors (malformed XML, zero image size) are always fatal.
pub fn assemble_split(
    split: Split,
    options: &AssembleOptions,
    vocab: &ClassVocabulary,
) -> Result<AssembleReport, Voc2YoloError> {
    info!("Preparing {split} set...");

    let layout = DatasetLayout::new(&options.output_dir);
    fs::create_dir_all(layout.images_dir(split)).map_err(Voc2YoloError::Io)?;
    fs::create_dir_all(layout.labels_dir(split)).map_err(Voc2YoloError::Io)?;

    let mut report = AssembleReport::new(split);

    for source in &options.sources {
        let source_layout = SourceLayout { root: &source.root };
        let mut source_report = SourceReport::new(&source.name);

        let manifest_path = source_layout.manifest(split);
        if !manifest_path.is_file() {
            if options.strict {
                return Err(Voc2YoloError::ManifestMissing {
                    source_name: source.name.clone(),
                    path: manifest_path,
                });
            }
            warn!("Skipping {}: no {split}.txt found!", source.name);
            report.sources.push(source_report);
            continue;
        }
        source_report.manifest_found = true;

        let image_ids = read_manifest(&manifest_path)?;
        source_report.listed = image_ids.len();

        for image_id in &image_ids {
            let image_src = source_layout.image(image_id);
            let xml_src = source_layout.annotation(image_id);

            if let Some((kind, path)) = first_missing(&image_src, &xml_src) {
                if options.strict {
                    return Err(Voc2YoloError::SourceFileMissing {
                        source_name: source.name.clone(),
                        image_id: image_id.clone(),
                        kind,
                        path,
                    });
                }
                debug!("{}: skipping '{image_id}', missing {kind}", source.name);
                source_report.skipped_missing += 1;
                continue;
            }

            fs::copy(&image_src, layout.image_path(split, &source.name, image_id))
                .map_err(Voc2YoloError::Io)?;
            let summary = convert_annotation(
                &xml_src,
                &layout.label_path(split, &source.name, image_id),
                vocab,
            )?;

            report.labels.merge(&summary);
            source_report.processed += 1;
        }

        debug!(
            "{}: {} of {} ids processed",
            source.name, source_report.processed, source_report.listed
        );
        report.sources.push(source_report);
    }

    if !options.sources.is_empty() && report.skipped_sources().count() == options.sources.len() {
        warn!("No source has a {split}.txt manifest; the {split} set is empty.");
    }
    info!(
        "{split} set is ready with {} images ({} skipped for missing files).",
        report.processed(),
        report.skipped_missing()
    );
    Ok(report)
}

/// Detector data config pointing at the assembled tree.
#[derive(Debug, Serialize)]
struct DataYaml<'a> {
    path: &'a Path,
    train: String,
    val: String,
    test: String,
    names: BTreeMap<usize, &'a str>,
    /// Version of the built-in class list the labels were produced with.
    #[serde(skip_serializing_if = "Option::is_none")]
    vocab_version: Option<u32>,
}

/// Writes the detector's data config for the dataset rooted at `dataset_root`.
///
/// Class names come from the same vocabulary used for conversion, so the
/// training config cannot drift from the label files.
pub fn write_data_yaml(
    dest: &Path,
    dataset_root: &Path,
    vocab: &ClassVocabulary,
) -> Result<(), Voc2YoloError> {
    let data = DataYaml {
        path: dataset_root,
        train: format!("images/{}", Split::Train),
        val: format!("images/{}", Split::Val),
        test: format!("images/{}", Split::Test),
        names: vocab
            .names()
            .iter()
            .enumerate()
            .map(|(class_id, name)| (class_id, name.as_str()))
            .collect(),
        vocab_version: vocab.version(),
    };

    let yaml = serde_yaml::to_string(&data).map_err(|source| Voc2YoloError::DataYamlWrite {
        path: dest.to_path_buf(),
        source,
    })?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(Voc2YoloError::Io)?;
    }
    fs::write(dest, yaml).map_err(Voc2YoloError::Io)
}

fn read_manifest(path: &Path) -> Result<Vec<String>, Voc2YoloError> {
    let content = fs::read_to_string(path).map_err(Voc2YoloError::Io)?;
    Ok(content.split_whitespace().map(ToOwned::to_owned).collect())
}

fn first_missing(image: &Path, annotation: &Path) -> Option<(&'static str, PathBuf)> {
    if !image.is_file() {
        Some(("image", image.to_path_buf()))
    } else if !annotation.is_file() {
        Some(("annotation", annotation.to_path_buf()))
    } else {
        None
    }
}

fn prefixed_file_name(source: &str, image_id: &str, extension: &str) -> String {
    format!("{source}_{image_id}.{extension}")
}
