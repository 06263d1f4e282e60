//! Configuration for sitesafe-eye

use crate::error::VisionError;
use serde::{Deserialize, Serialize};
use sitesafe_core::ClassCatalog;
use std::path::PathBuf;

/// Detector and rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// ONNX export of the trained model
    pub model_path: PathBuf,
    /// Class labels in id order, used when the model carries no `names` metadata
    pub class_names: Option<Vec<String>>,
    /// Minimum class score kept after decoding
    pub confidence_threshold: f32,
    /// IoU above which a lower-scored box of the same class is suppressed
    pub iou_threshold: f32,
    /// Upper bound on detections per image
    pub max_detections: usize,
    /// Model input (width, height); read from the model when unset
    pub input_size: Option<(u32, u32)>,
    /// ONNX Runtime intra-op threads; runtime default when unset
    pub intra_threads: Option<usize>,
    /// Render an annotated copy of each inspected image
    pub annotate: bool,
    /// Box outline thickness in pixels
    pub box_thickness: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("best.onnx"),
            class_names: None,
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
            input_size: None,
            intra_threads: None,
            annotate: true,
            box_thickness: 3,
        }
    }
}

/// Bounds shared by configured and model-declared input sizes
pub(crate) fn check_input_size(width: u32, height: u32) -> Result<(), String> {
    if width < 32 || height < 32 || width > 4096 || height > 4096 {
        return Err(format!(
            "input_size must be between 32 and 4096 on each side, got {}x{}",
            width, height
        ));
    }
    // YOLO strides require multiples of 32
    if width % 32 != 0 || height % 32 != 0 {
        return Err(format!(
            "input_size must be a multiple of 32, got {}x{}",
            width, height
        ));
    }
    Ok(())
}

impl VisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), VisionError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(VisionError::Config("model_path must not be empty".to_string()));
        }

        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("iou_threshold", self.iou_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(VisionError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if self.max_detections == 0 || self.max_detections > 10_000 {
            return Err(VisionError::Config(
                "max_detections must be between 1 and 10000".to_string(),
            ));
        }

        if let Some((width, height)) = self.input_size {
            check_input_size(width, height).map_err(VisionError::Config)?;
        }

        if let Some(threads) = self.intra_threads {
            if threads == 0 || threads > 256 {
                return Err(VisionError::Config(
                    "intra_threads must be between 1 and 256".to_string(),
                ));
            }
        }

        if self.box_thickness == 0 || self.box_thickness > 20 {
            return Err(VisionError::Config(
                "box_thickness must be between 1 and 20".to_string(),
            ));
        }

        self.fallback_catalog()?;

        Ok(())
    }

    /// Catalog built from `class_names`, if configured
    pub fn fallback_catalog(&self) -> Result<Option<ClassCatalog>, VisionError> {
        match &self.class_names {
            Some(names) => Ok(Some(ClassCatalog::new(names.iter().cloned())?)),
            None => Ok(None),
        }
    }
}
