//! Parsing of the metadata Ultralytics embeds in ONNX exports
//!
//! Each entry is a YAML flow value: `names` is a mapping such as
//! `{0: 'helmet', 1: 'no-helmet', 2: "worker's vest"}` and `imgsz` a list
//! such as `[640, 640]` (height, width).

use crate::config::check_input_size;
use crate::error::VisionError;
use serde::Deserialize;
use sitesafe_core::ClassCatalog;
use std::collections::HashMap;

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageSize {
    Square(u32),
    Dims(Vec<u32>),
}

/// Parse the `names` metadata entry into a catalog
pub fn parse_names(raw: &str) -> Result<ClassCatalog, VisionError> {
    let names: HashMap<usize, String> = serde_yaml::from_str(raw)
        .map_err(|e| VisionError::Model(format!("invalid names metadata {}: {}", raw, e)))?;
    Ok(ClassCatalog::from_indexed(&names)?)
}

/// Parse the `imgsz` metadata entry into (width, height)
pub fn parse_imgsz(raw: &str) -> Result<(u32, u32), VisionError> {
    let size = serde_yaml::from_str::<ImageSize>(raw)
        .map_err(|e| VisionError::Model(format!("invalid imgsz metadata {}: {}", raw, e)))?;

    let (width, height) = match size {
        ImageSize::Square(side) => (side, side),
        ImageSize::Dims(dims) => match dims.as_slice() {
            [side] => (*side, *side),
            [height, width] => (*width, *height),
            _ => {
                return Err(VisionError::Model(format!(
                    "imgsz metadata must have one or two dimensions, got {}",
                    raw
                )))
            }
        },
    };

    check_input_size(width, height)
        .map_err(|e| VisionError::Model(format!("model imgsz is unusable: {}", e)))?;
    Ok((width, height))
}
