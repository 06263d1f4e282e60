//! sitesafe-eye: detection side of the SiteSafe inspector
//!
//! Wraps a pretrained YOLO model behind the [`Detector`] trait and runs the
//! full per-image inspection: decode, detect, tally, judge, annotate.

pub mod config;
pub mod detector;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod processing;

pub use config::VisionConfig;
pub use detector::Detector;
pub use error::VisionError;
pub use models::YoloModel;
pub use pipeline::{InspectionPipeline, InspectionReport};
