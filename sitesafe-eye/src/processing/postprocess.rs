//! Decoding of YOLOv8-style detection heads

use crate::error::VisionError;
use crate::processing::preprocess::Letterbox;
use ndarray::ArrayViewD;
use sitesafe_core::{BoundingBox, ClassCatalog, Detection};
use tracing::debug;

/// Thresholds applied while decoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeParams {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

/// Decode a `[1, 4 + nc, anchors]` (or transposed `[1, anchors, 4 + nc]`)
/// output into detections in original image coordinates.
///
/// Each anchor row is `cx, cy, w, h` in model-input pixels followed by one
/// score per class.
pub fn decode_yolo(
    output: ArrayViewD<'_, f32>,
    catalog: &ClassCatalog,
    letterbox: &Letterbox,
    original_size: (u32, u32),
    params: &DecodeParams,
) -> Result<Vec<Detection>, VisionError> {
    let shape = output.shape();
    if shape.len() != 3 || shape[0] != 1 {
        return Err(VisionError::Model(format!(
            "unexpected output shape {:?}, expected [1, 4 + classes, anchors]",
            shape
        )));
    }

    let num_classes = catalog.len();
    let channels = 4 + num_classes;
    let channels_first = if shape[1] == channels {
        true
    } else if shape[2] == channels {
        false
    } else {
        return Err(VisionError::Model(format!(
            "output shape {:?} does not match a catalog of {} classes",
            shape, num_classes
        )));
    };
    let num_anchors = if channels_first { shape[2] } else { shape[1] };

    let value = |channel: usize, anchor: usize| -> f32 {
        if channels_first {
            output[[0, channel, anchor]]
        } else {
            output[[0, anchor, channel]]
        }
    };

    let (orig_w, orig_h) = (original_size.0 as f32, original_size.1 as f32);
    let mut candidates = Vec::new();

    for anchor in 0..num_anchors {
        let mut best_class = 0;
        let mut best_score = f32::NEG_INFINITY;
        for class_id in 0..num_classes {
            let score = value(4 + class_id, anchor);
            if score > best_score {
                best_score = score;
                best_class = class_id;
            }
        }

        if !best_score.is_finite() || best_score < params.confidence_threshold {
            continue;
        }

        let input_box = BoundingBox::from_center(
            value(0, anchor),
            value(1, anchor),
            value(2, anchor),
            value(3, anchor),
        );
        let bbox = letterbox.to_original(&input_box).clamp_to(orig_w, orig_h);
        if bbox.area() <= 0.0 {
            continue;
        }

        let label = catalog.label(best_class).ok_or_else(|| {
            VisionError::Model(format!("class id {} outside catalog", best_class))
        })?;
        candidates.push(Detection::new(best_class, label, best_score.min(1.0), bbox));
    }

    debug!(
        "{} of {} anchors above confidence {}",
        candidates.len(),
        num_anchors,
        params.confidence_threshold
    );

    let mut kept = non_max_suppression(candidates, params.iou_threshold);
    kept.truncate(params.max_detections);
    Ok(kept)
}

/// Class-aware non-maximum suppression. Returns detections sorted by
/// descending confidence.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.retain(|d| d.confidence.is_finite());
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut suppressed = vec![false; detections.len()];
    let mut keep = Vec::new();

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        for j in (i + 1)..detections.len() {
            if suppressed[j] || detections[i].class_id != detections[j].class_id {
                continue;
            }
            if detections[i].bbox.iou(&detections[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
        keep.push(detections[i].clone());
    }

    keep
}
