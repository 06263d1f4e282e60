//! Per-image inspection: detect, tally, judge, annotate

use crate::detector::Detector;
use crate::error::VisionError;
use crate::processing::draw_detections;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::Serialize;
use sitesafe_core::{aggregate, evaluate, ClassCatalog, CountTable, Detection, SafetyVerdict};
use std::io::Cursor;
use std::time::Instant;
use tracing::debug;

/// Outcome of inspecting one image
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub width: u32,
    pub height: u32,
    pub detections: Vec<Detection>,
    pub counts: CountTable,
    pub verdict: SafetyVerdict,
    pub inference_ms: f64,
    #[serde(skip)]
    pub annotated: Option<RgbImage>,
}

impl InspectionReport {
    /// Annotated image encoded as PNG, if annotation was enabled
    pub fn annotated_png(&self) -> Result<Option<Vec<u8>>, VisionError> {
        let Some(image) = &self.annotated else {
            return Ok(None);
        };
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(Some(buffer.into_inner()))
    }
}

/// Runs a detector over images and turns its output into a report
pub struct InspectionPipeline {
    detector: Box<dyn Detector>,
    annotate: bool,
    box_thickness: u32,
}

impl InspectionPipeline {
    pub fn new(detector: Box<dyn Detector>) -> Self {
        Self {
            detector,
            annotate: true,
            box_thickness: 3,
        }
    }

    /// Enable or disable the annotated overlay
    pub fn with_annotation(mut self, annotate: bool, box_thickness: u32) -> Self {
        self.annotate = annotate;
        self.box_thickness = box_thickness.max(1);
        self
    }

    pub fn catalog(&self) -> &ClassCatalog {
        self.detector.catalog()
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    /// Inspect a decoded image.
    ///
    /// Fails with [`VisionError::Core`] if the detector reports a label
    /// outside its own catalog; no partial report is produced.
    pub fn inspect(&mut self, image: &DynamicImage) -> Result<InspectionReport, VisionError> {
        let rgb = image.to_rgb8();
        let started = Instant::now();

        let detections = self.detector.detect(&rgb)?;
        let inference_ms = started.elapsed().as_secs_f64() * 1000.0;

        let counts = aggregate(self.detector.catalog(), &detections)?;
        let verdict = evaluate(&counts);
        debug!(
            "{} found {} objects in {:.1} ms: {}",
            self.detector.name(),
            detections.len(),
            inference_ms,
            verdict.message()
        );

        let annotated = self
            .annotate
            .then(|| draw_detections(&rgb, &detections, self.box_thickness));

        Ok(InspectionReport {
            width: rgb.width(),
            height: rgb.height(),
            detections,
            counts,
            verdict,
            inference_ms,
            annotated,
        })
    }

    /// Decode encoded image bytes (JPEG, PNG, ...) and inspect them
    pub fn inspect_bytes(&mut self, bytes: &[u8]) -> Result<InspectionReport, VisionError> {
        if bytes.is_empty() {
            return Err(VisionError::Processing("empty image upload".to_string()));
        }
        let image = image::load_from_memory(bytes)?;
        self.inspect(&image)
    }
}
