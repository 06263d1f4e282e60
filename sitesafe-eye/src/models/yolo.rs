//! YOLO object detection model (ONNX Runtime)

use crate::config::VisionConfig;
use crate::detector::Detector;
use crate::error::VisionError;
use crate::models::metadata::{parse_imgsz, parse_names};
use crate::processing::{decode_yolo, letterbox, DecodeParams};
use image::RgbImage;
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use sitesafe_core::{ClassCatalog, Detection};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Input size used when neither the config nor the model states one
const DEFAULT_INPUT_SIZE: (u32, u32) = (640, 640);

/// YOLOv8-family detector loaded from an Ultralytics ONNX export
pub struct YoloModel {
    session: Session,
    catalog: ClassCatalog,
    input_size: (u32, u32),
    params: DecodeParams,
    name: String,
}

impl YoloModel {
    /// Load the model at `config.model_path`.
    ///
    /// The class catalog comes from the export's `names` metadata, falling
    /// back to `config.class_names`; loading fails if neither is present.
    pub fn load(config: &VisionConfig) -> Result<Self, VisionError> {
        config.validate()?;

        let path = &config.model_path;
        if !path.exists() {
            return Err(VisionError::Model(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let mut builder = Session::builder()
            .map_err(VisionError::ort)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(VisionError::ort)?;
        if let Some(threads) = config.intra_threads {
            builder = builder.with_intra_threads(threads).map_err(VisionError::ort)?;
        }
        let session = builder
            .commit_from_file(path)
            .map_err(|e| VisionError::Ort(format!("failed to load {}: {}", path.display(), e)))?;

        let (raw_names, raw_imgsz) = {
            let metadata = session.metadata().map_err(VisionError::ort)?;
            (
                metadata.custom("names").ok().flatten(),
                metadata.custom("imgsz").ok().flatten(),
            )
        };

        let fallback = config.fallback_catalog()?;
        let catalog = match (raw_names, fallback) {
            (Some(raw), fallback) => {
                let catalog = parse_names(&raw)?;
                if let Some(configured) = fallback {
                    if configured != catalog {
                        warn!("Configured class_names differ from model metadata; using model metadata");
                    }
                }
                catalog
            }
            (None, Some(configured)) => {
                info!("Model has no names metadata; using configured class_names");
                configured
            }
            (None, None) => {
                return Err(VisionError::Model(
                    "model has no names metadata and no class_names are configured".to_string(),
                ))
            }
        };

        let input_size = match (config.input_size, raw_imgsz.as_deref()) {
            (Some(size), _) => size,
            (None, Some(raw)) => parse_imgsz(raw)?,
            (None, None) => DEFAULT_INPUT_SIZE,
        };

        let name = path
            .file_stem()
            .map(|s| format!("YOLO ({})", s.to_string_lossy()))
            .unwrap_or_else(|| "YOLO".to_string());

        info!(
            "YOLO model loaded from {:?}: {} classes, input {}x{}",
            path,
            catalog.len(),
            input_size.0,
            input_size.1
        );

        Ok(Self {
            session,
            catalog,
            input_size,
            params: DecodeParams {
                confidence_threshold: config.confidence_threshold,
                iou_threshold: config.iou_threshold,
                max_detections: config.max_detections,
            },
            name,
        })
    }

    /// Model input (width, height)
    pub fn input_size(&self) -> (u32, u32) {
        self.input_size
    }
}

impl Detector for YoloModel {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>, VisionError> {
        debug!("Running YOLO detection on {}x{} image", image.width(), image.height());
        let started = Instant::now();

        let (tensor, geometry) = letterbox(image, self.input_size.0, self.input_size.1)?;
        let tensor = tensor.into_dyn();
        let input = TensorRef::from_array_view(&tensor).map_err(VisionError::ort)?;

        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(|e| VisionError::Ort(format!("YOLO inference failed: {}", e)))?;
        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| VisionError::Ort(format!("failed to extract output tensor: {}", e)))?;

        let detections = decode_yolo(
            output,
            &self.catalog,
            &geometry,
            image.dimensions(),
            &self.params,
        )?;

        debug!(
            "YOLO detected {} objects in {:.1} ms",
            detections.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(detections)
    }

    fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_missing_model() {
        let mut config = VisionConfig::default();
        config.model_path = PathBuf::from("/nonexistent/best.onnx");
        let err = YoloModel::load(&config).err().unwrap();
        assert!(matches!(err, VisionError::Model(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let mut config = VisionConfig::default();
        config.confidence_threshold = 2.0;
        assert!(matches!(YoloModel::load(&config), Err(VisionError::Config(_))));
    }
}
