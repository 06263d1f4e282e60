//! Detection types shared by the detector and the aggregation side

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates of the original image (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Build from center coordinates, the layout YOLO heads emit
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    pub fn area(&self) -> f32 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return 0.0;
        }
        self.width * self.height
    }

    /// Clip the box to `[0, width] x [0, height]`
    pub fn clamp_to(&self, width: f32, height: f32) -> Self {
        let x1 = self.x.clamp(0.0, width);
        let y1 = self.y.clamp(0.0, height);
        let x2 = (self.x + self.width).clamp(0.0, width);
        let y2 = (self.y + self.height).clamp(0.0, height);
        Self {
            x: x1,
            y: y1,
            width: (x2 - x1).max(0.0),
            height: (y2 - y1).max(0.0),
        }
    }

    /// Intersection over union; 0.0 for degenerate or non-finite boxes
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let values = [
            self.x, self.y, self.width, self.height,
            other.x, other.y, other.width, other.height,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return 0.0;
        }

        let inter_x_min = self.x.max(other.x);
        let inter_y_min = self.y.max(other.y);
        let inter_x_max = (self.x + self.width).min(other.x + other.width);
        let inter_y_max = (self.y + self.height).min(other.y + other.height);

        if inter_x_max <= inter_x_min || inter_y_max <= inter_y_min {
            return 0.0;
        }

        let inter_area = (inter_x_max - inter_x_min) * (inter_y_max - inter_y_min);
        let union_area = self.area() + other.area() - inter_area;
        if union_area <= 0.0 {
            return 0.0;
        }

        (inter_area / union_area).clamp(0.0, 1.0)
    }
}

/// One recognized object instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Index of the label in the detector's catalog
    pub class_id: usize,
    pub class_label: String,
    /// Score in [0, 1]. Not used by aggregation or evaluation.
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class_id: usize, class_label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            class_id,
            class_label: class_label.into(),
            confidence,
            bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_identical() {
        let b = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
        assert!((b.iou(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint() {
        let a = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
        let b = BoundingBox::new(200.0, 200.0, 50.0, 50.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_partial() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 10.0, 10.0);
        // intersection 50, union 150
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_iou_non_finite() {
        let a = BoundingBox::new(f32::NAN, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
        let c = BoundingBox::new(0.0, 0.0, f32::INFINITY, 10.0);
        assert_eq!(b.iou(&c), 0.0);
    }

    #[test]
    fn test_from_center() {
        let b = BoundingBox::from_center(50.0, 40.0, 20.0, 10.0);
        assert_eq!(b, BoundingBox::new(40.0, 35.0, 20.0, 10.0));
    }

    #[test]
    fn test_clamp_to() {
        let b = BoundingBox::new(-10.0, 90.0, 50.0, 50.0).clamp_to(100.0, 100.0);
        assert_eq!(b, BoundingBox::new(0.0, 90.0, 40.0, 10.0));

        let outside = BoundingBox::new(150.0, 150.0, 10.0, 10.0).clamp_to(100.0, 100.0);
        assert_eq!(outside.area(), 0.0);
    }

    #[test]
    fn test_area_negative() {
        assert_eq!(BoundingBox::new(0.0, 0.0, -5.0, 5.0).area(), 0.0);
    }
}
