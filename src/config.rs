//! Pipeline configuration.
//!
//! Every field has a default that reproduces the stock VOC2007 + VOC2012
//! pipeline, so a config file is only needed to change paths, the vocabulary
//! or training parameters. Loaded from YAML:
//!
//! ```yaml
//! output_dir: dataset
//! strict: false
//! sources:
//!   - name: VOC2007
//!     root: ../VOCDevKit/VOC2007
//! classes: [person, car]
//! train:
//!   epochs: 20
//!   device: "0"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Voc2YoloError;
use crate::vocab::ClassVocabulary;

/// One VOC dataset root contributing images to every split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Prefix for output file names, e.g. `VOC2007`.
    pub name: String,
    /// Directory containing `Annotations/`, `JPEGImages/` and `ImageSets/`.
    pub root: PathBuf,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// Parameters handed to the external detector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Pre-trained weights to start from.
    pub model: String,
    /// Detector data config; written by `prepare`.
    pub data: PathBuf,
    pub epochs: u32,
    pub imgsz: u32,
    pub batch: u32,
    /// `cpu`, or a CUDA device index such as `0`.
    pub device: String,
    /// Directory the detector writes its runs into.
    pub runs_dir: PathBuf,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model: "yolov8n.pt".to_string(),
            data: PathBuf::from("data.yaml"),
            epochs: 10,
            imgsz: 416,
            batch: 8,
            device: "cpu".to_string(),
            runs_dir: PathBuf::from("runs/detect"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub sources: Vec<SourceConfig>,
    /// Fail on a missing manifest, image or annotation instead of skipping it.
    pub strict: bool,
    /// Overrides the built-in VOC vocabulary. Order defines class ids.
    pub classes: Option<Vec<String>>,
    /// Program used for train/val/export.
    pub detector_program: String,
    pub train: TrainConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dataset"),
            sources: vec![
                SourceConfig::new("VOC2007", "../VOCDevKit/VOC2007"),
                SourceConfig::new("VOC2012", "../VOCDevKit/VOC2012"),
            ],
            strict: false,
            classes: None,
            detector_program: "yolo".to_string(),
            train: TrainConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads a YAML config file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, Voc2YoloError> {
        let data = fs::read_to_string(path).map_err(Voc2YoloError::Io)?;
        serde_yaml::from_str(&data).map_err(|source| Voc2YoloError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Voc2YoloError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// The vocabulary every stage of the pipeline shares.
    pub fn vocabulary(&self) -> Result<ClassVocabulary, Voc2YoloError> {
        match &self.classes {
            Some(names) => ClassVocabulary::new(names.iter().cloned()),
            None => Ok(ClassVocabulary::pascal_voc()),
        }
    }
}
