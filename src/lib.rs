//! voc2yolo: Pascal VOC to YOLO dataset conversion.
//!
//! Converts VOC XML annotations (absolute pixel boxes) into YOLO label files
//! (one normalized `class cx cy w h` record per line), assembles a
//! split-organized dataset tree, and drives an external detector CLI for
//! training, evaluation and export.
//!
//! # Modules
//!
//! - [`convert`]: the VOC XML to YOLO label conversion routine
//! - [`geometry`]: pixel and normalized box types
//! - [`vocab`]: the shared, ordered class vocabulary
//! - [`assemble`]: per-split dataset assembly
//! - [`detector`]: external detector train/eval/export glue
//! - [`preview`]: text preview of generated labels
//! - [`config`]: pipeline configuration
//! - [`error`]: error types

pub mod assemble;
pub mod config;
pub mod convert;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod preview;
pub mod vocab;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

pub use error::Voc2YoloError;

use assemble::{AssembleOptions, AssembleReport, Split};
use config::PipelineConfig;
use detector::{Detector, UltralyticsCli};
use vocab::ClassVocabulary;

const CLASSES_FILE: &str = "classes.txt";

/// The voc2yolo CLI application.
#[derive(Parser)]
#[command(name = "voc2yolo")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Pipeline config file (YAML). Defaults reproduce the VOC2007 + VOC2012 pipeline.
    #[arg(long, global = true, env = "VOC2YOLO_CONFIG")]
    config: Option<PathBuf>,

    /// classes.txt overriding the class vocabulary (one name per line, in id order).
    #[arg(long, global = true)]
    classes: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Build dataset/{images,labels}/{split} from the VOC sources.
    Prepare(PrepareArgs),
    /// Convert a single VOC XML file to a YOLO label file.
    Convert(ConvertArgs),
    /// Print the boxes of converted labels in pixel coordinates.
    Preview(PreviewArgs),
    /// Train a detector on the prepared dataset.
    Train(TrainArgs),
    /// Evaluate trained weights on the test split.
    Eval(RecordArgs),
    /// Export trained weights to ONNX.
    Export(RecordArgs),
    /// Run prepare, preview, train, eval and export in sequence.
    All(AllArgs),
}

#[derive(clap::Args)]
struct PrepareArgs {
    /// Split(s) to prepare ('train', 'val', 'test'); defaults to all three.
    #[arg(long = "split", value_parser = parse_split)]
    splits: Vec<Split>,

    /// Fail on a missing manifest, image or annotation instead of skipping it.
    #[arg(long)]
    strict: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

/// How `prepare` prints its reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// VOC XML annotation file.
    input: PathBuf,

    /// Label file to create or overwrite.
    output: PathBuf,
}

#[derive(clap::Args)]
struct PreviewArgs {
    /// Images directory; defaults to <output_dir>/images/train.
    #[arg(long)]
    images: Option<PathBuf>,

    /// Labels directory; defaults to <output_dir>/labels/train.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Maximum number of images to show.
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[derive(clap::Args)]
struct TrainArgs {
    /// Number of training epochs.
    #[arg(long)]
    epochs: Option<u32>,

    /// Device to use: 'cpu' or '0', '1', etc. for CUDA.
    #[arg(long)]
    device: Option<String>,
}

#[derive(clap::Args)]
struct RecordArgs {
    /// Run record holding the trained weights, e.g. train, train2, train3.
    #[arg(long, default_value = "train")]
    record: String,
}

#[derive(clap::Args)]
struct AllArgs {
    #[command(flatten)]
    train: TrainArgs,

    #[command(flatten)]
    record: RecordArgs,

    /// Fail on a missing manifest, image or annotation instead of skipping it.
    #[arg(long)]
    strict: bool,
}

/// Run the voc2yolo CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), Voc2YoloError> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // No subcommand: print a usage hint and exit successfully.
        println!("voc2yolo {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Pascal VOC to YOLO dataset converter.");
        println!();
        println!("Run 'voc2yolo --help' for usage information.");
        return Ok(());
    };

    let mut config = PipelineConfig::load_or_default(cli.config.as_deref())?;
    let vocab = match &cli.classes {
        Some(path) => ClassVocabulary::from_classes_txt(path)?,
        None => config.vocabulary()?,
    };

    match command {
        Commands::Prepare(args) => {
            config.strict |= args.strict;
            let splits = if args.splits.is_empty() {
                Split::ALL.to_vec()
            } else {
                args.splits
            };
            let reports = run_prepare(&config, &vocab, &splits)?;
            print_reports(&reports, args.output)
        }
        Commands::Convert(args) => run_convert(&args.input, &args.output, &vocab),
        Commands::Preview(args) => run_preview(&config, &vocab, args),
        Commands::Train(args) => {
            apply_train_args(&mut config, &args);
            detector_for(&config).train(&config.train)
        }
        Commands::Eval(args) => detector_for(&config).evaluate(&config.train, &args.record),
        Commands::Export(args) => run_export(&detector_for(&config), &config, &vocab, &args.record),
        Commands::All(args) => {
            config.strict |= args.strict;
            apply_train_args(&mut config, &args.train);

            println!("\n=== Preparing the datasets ===");
            let reports = run_prepare(&config, &vocab, &Split::ALL)?;
            print_reports(&reports, ReportFormat::Text)?;

            println!("\n=== Previewing samples ===");
            run_preview(
                &config,
                &vocab,
                PreviewArgs {
                    images: None,
                    labels: None,
                    limit: 5,
                },
            )?;

            let detector = detector_for(&config);
            println!("\n=== Training the YOLO model ===");
            detector.train(&config.train)?;
            println!("\n=== Evaluating the YOLO model ===");
            detector.evaluate(&config.train, &args.record.record)?;
            println!("\n=== Exporting the YOLO model ===");
            run_export(&detector, &config, &vocab, &args.record.record)
        }
    }
}

/// Assemble each split, then write the detector data config.
fn run_prepare(
    config: &PipelineConfig,
    vocab: &ClassVocabulary,
    splits: &[Split],
) -> Result<Vec<AssembleReport>, Voc2YoloError> {
    let options = AssembleOptions {
        output_dir: config.output_dir.clone(),
        sources: config.sources.clone(),
        strict: config.strict,
    };

    let mut reports = Vec::with_capacity(splits.len());
    for split in splits {
        reports.push(assemble::assemble_split(*split, &options, vocab)?);
    }

    assemble::write_data_yaml(&config.train.data, &config.output_dir, vocab)?;
    info!("Wrote detector data config to {}", config.train.data.display());

    Ok(reports)
}

fn print_reports(reports: &[AssembleReport], format: ReportFormat) -> Result<(), Voc2YoloError> {
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(reports)?),
        ReportFormat::Text => {
            for report in reports {
                println!("{report}");
            }
        }
    }
    Ok(())
}

fn run_convert(input: &Path, output: &Path, vocab: &ClassVocabulary) -> Result<(), Voc2YoloError> {
    let summary = convert::convert_annotation(input, output, vocab)?;
    println!(
        "Wrote {} record(s) to {} (dropped {} difficult, {} out-of-vocabulary)",
        summary.records,
        output.display(),
        summary.skipped_difficult,
        summary.skipped_unknown_class
    );
    Ok(())
}

fn run_preview(
    config: &PipelineConfig,
    vocab: &ClassVocabulary,
    args: PreviewArgs,
) -> Result<(), Voc2YoloError> {
    let layout = assemble::DatasetLayout::new(&config.output_dir);
    let images = args.images.unwrap_or_else(|| layout.images_dir(Split::Train));
    let labels = args.labels.unwrap_or_else(|| layout.labels_dir(Split::Train));

    let entries = preview::preview_labels(&images, &labels, vocab, Some(args.limit))?;
    if entries.is_empty() {
        println!("No labelled images found under {}", images.display());
    }
    for entry in entries {
        println!("{entry}");
    }
    Ok(())
}

/// Export the model, then write `classes.txt` beside it so an inference
/// consumer gets the vocabulary the labels were produced with.
fn run_export(
    detector: &impl Detector,
    config: &PipelineConfig,
    vocab: &ClassVocabulary,
    record: &str,
) -> Result<(), Voc2YoloError> {
    let model = detector.export(&config.train, record)?;
    let classes = model.with_file_name(CLASSES_FILE);
    vocab.write_classes_txt(&classes)?;
    println!("Exported {}", model.display());
    println!("Wrote {} class name(s) to {}", vocab.len(), classes.display());
    Ok(())
}

fn apply_train_args(config: &mut PipelineConfig, args: &TrainArgs) {
    if let Some(epochs) = args.epochs {
        config.train.epochs = epochs;
    }
    if let Some(device) = &args.device {
        config.train.device = device.clone();
    }
}

fn detector_for(config: &PipelineConfig) -> UltralyticsCli {
    UltralyticsCli::new(&config.detector_program)
}

fn parse_split(raw: &str) -> Result<Split, String> {
    raw.parse::<Split>().map_err(|err| err.to_string())
}
