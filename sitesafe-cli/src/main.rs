// SiteSafe command line interface
// Inspect construction-site photos for missing safety equipment

mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sitesafe_eye::{Detector, InspectionPipeline, VisionConfig, YoloModel};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

/// Exit status when at least one worker is missing equipment
const VIOLATION_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(name = "sitesafe")]
#[command(about = "Construction safety equipment detection", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// ONNX model exported by Ultralytics
    #[arg(long, short, default_value = "best.onnx", global = true)]
    model: PathBuf,

    /// Class labels in id order, for models without names metadata
    #[arg(long, value_delimiter = ',', global = true)]
    class_names: Option<Vec<String>>,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect one image and report the safety analysis
    Inspect {
        /// Image file (JPEG or PNG)
        image: PathBuf,

        /// Confidence threshold
        #[arg(long, default_value_t = 0.25)]
        conf: f32,

        /// IoU threshold for non-maximum suppression
        #[arg(long, default_value_t = 0.7)]
        iou: f32,

        /// Write the annotated image here (PNG)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the classes the model can detect
    Classes,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    let mut config = VisionConfig {
        model_path: cli.model.clone(),
        class_names: cli.class_names.clone(),
        ..VisionConfig::default()
    };

    match cli.command {
        Commands::Inspect {
            image,
            conf,
            iou,
            output: annotated_path,
            json,
        } => {
            config.confidence_threshold = conf;
            config.iou_threshold = iou;
            config.annotate = annotated_path.is_some();
            inspect(&config, &image, annotated_path.as_deref(), json)
        }
        Commands::Classes => {
            let model = YoloModel::load(&config).context("failed to load detection model")?;
            print!("{}", output::class_list(model.catalog()));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn inspect(
    config: &VisionConfig,
    image: &std::path::Path,
    annotated_path: Option<&std::path::Path>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let bytes = std::fs::read(image).with_context(|| format!("failed to read {}", image.display()))?;

    let model = YoloModel::load(config).context("failed to load detection model")?;
    let mut pipeline = InspectionPipeline::new(Box::new(model))
        .with_annotation(config.annotate, config.box_thickness);
    debug!("Using detector {}", pipeline.detector_name());

    let report = pipeline
        .inspect_bytes(&bytes)
        .with_context(|| format!("failed to inspect {}", image.display()))?;
    info!(
        "{}: {} detections in {:.1} ms",
        image.display(),
        report.detections.len(),
        report.inference_ms
    );

    if let Some(path) = annotated_path {
        if let Some(png) = report.annotated_png()? {
            std::fs::write(path, png).with_context(|| format!("failed to write {}", path.display()))?;
            info!("Annotated image written to {}", path.display());
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Detection counts");
        print!("{}", output::count_table(&report.counts));
        println!();
        println!("Safety analysis");
        print!("{}", output::safety_analysis(&report.verdict));
    }

    Ok(if report.verdict.is_violation() {
        ExitCode::from(VIOLATION_EXIT_CODE)
    } else {
        ExitCode::SUCCESS
    })
}
