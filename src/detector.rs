//! Glue to the external detector framework.
//!
//! Training, evaluation and export are delegated to a detector CLI; this crate
//! only assembles the arguments and checks the exit status. [`UltralyticsCli`]
//! targets the Ultralytics `yolo` command (`yolo detect train key=value ...`).

use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;

use crate::config::TrainConfig;
use crate::error::Voc2YoloError;

const WEIGHTS_FILE: &str = "best.pt";
const EXPORT_FORMAT: &str = "onnx";

/// Train / evaluate / export entry points of a detector framework.
pub trait Detector {
    /// Trains a model on `config.data`, producing weights under a run record.
    fn train(&self, config: &TrainConfig) -> Result<(), Voc2YoloError>;

    /// Evaluates the weights of run `record` on the test split.
    fn evaluate(&self, config: &TrainConfig, record: &str) -> Result<(), Voc2YoloError>;

    /// Exports the weights of run `record` to a portable inference graph and
    /// returns the path of the exported file.
    fn export(&self, config: &TrainConfig, record: &str) -> Result<PathBuf, Voc2YoloError>;
}

/// Drives the Ultralytics `yolo` CLI.
#[derive(Clone, Debug)]
pub struct UltralyticsCli {
    program: String,
}

impl UltralyticsCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn train_command(&self, config: &TrainConfig) -> Command {
        let mut command = Command::new(&self.program);
        command.args(["detect", "train"]).args([
            key_value("data", config.data.display()),
            key_value("model", &config.model),
            key_value("epochs", config.epochs),
            key_value("imgsz", config.imgsz),
            key_value("batch", config.batch),
            key_value("device", &config.device),
        ]);
        command
    }

    pub fn evaluate_command(&self, config: &TrainConfig, weights: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(["detect", "val"]).args([
            key_value("model", weights.display()),
            key_value("data", config.data.display()),
            key_value("split", "test"),
        ]);
        command
    }

    pub fn export_command(&self, weights: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.arg("export").args([
            key_value("model", weights.display()),
            key_value("format", EXPORT_FORMAT),
            key_value("dynamic", "True"),
        ]);
        command
    }

    fn run(&self, mut command: Command, step: &'static str) -> Result<(), Voc2YoloError> {
        info!("Running {:?}", command);
        let status = command
            .status()
            .map_err(|source| Voc2YoloError::ExternalToolSpawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Voc2YoloError::ExternalToolFailed {
                program: self.program.clone(),
                step,
                status,
            })
        }
    }
}

impl Default for UltralyticsCli {
    fn default() -> Self {
        Self::new("yolo")
    }
}

impl Detector for UltralyticsCli {
    fn train(&self, config: &TrainConfig) -> Result<(), Voc2YoloError> {
        self.run(self.train_command(config), "train")
    }

    fn evaluate(&self, config: &TrainConfig, record: &str) -> Result<(), Voc2YoloError> {
        let weights = existing_weights(config, record)?;
        self.run(self.evaluate_command(config, &weights), "val")
    }

    fn export(&self, config: &TrainConfig, record: &str) -> Result<PathBuf, Voc2YoloError> {
        let weights = existing_weights(config, record)?;
        self.run(self.export_command(&weights), "export")?;
        Ok(weights.with_extension(EXPORT_FORMAT))
    }
}

/// Location of the best weights for run `record`, e.g.
/// `runs/detect/train2/weights/best.pt`.
pub fn weights_path(runs_dir: &Path, record: &str) -> PathBuf {
    runs_dir.join(record).join("weights").join(WEIGHTS_FILE)
}

fn existing_weights(config: &TrainConfig, record: &str) -> Result<PathBuf, Voc2YoloError> {
    let weights = weights_path(&config.runs_dir, record);
    if weights.is_file() {
        Ok(weights)
    } else {
        Err(Voc2YoloError::WeightsNotFound { path: weights })
    }
}

fn key_value(key: &str, value: impl std::fmt::Display) -> String {
    format!("{key}={value}")
}
