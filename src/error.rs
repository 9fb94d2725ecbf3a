use std::path::PathBuf;
use thiserror::Error;

/// The main error type for voc2yolo operations.
#[derive(Debug, Error)]
pub enum Voc2YoloError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse VOC XML {path}: {message}")]
    VocXmlParse { path: PathBuf, message: String },

    #[error("Invalid image geometry in {path}: {width}x{height} (width and height must be positive)")]
    InvalidGeometry {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    #[error("Manifest not found for source '{source_name}': {path}")]
    ManifestMissing { source_name: String, path: PathBuf },

    #[error("Missing {kind} for '{image_id}' in source '{source_name}': {path}")]
    SourceFileMissing {
        source_name: String,
        image_id: String,
        kind: &'static str,
        path: PathBuf,
    },

    #[error("Failed to parse YOLO label {path}:{line}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid classes file {path}: {message}")]
    ClassesTxtInvalid { path: PathBuf, message: String },

    #[error("Invalid class vocabulary: {0}")]
    VocabularyInvalid(String),

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write data config {path}: {source}")]
    DataYamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize report: {0}")]
    ReportJson(#[from] serde_json::Error),

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Trained weights not found: {path} (check the --record name)")]
    WeightsNotFound { path: PathBuf },

    #[error("Failed to launch '{program}': {source}")]
    ExternalToolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program} {step}' exited with {status}")]
    ExternalToolFailed {
        program: String,
        step: &'static str,
        status: std::process::ExitStatus,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
