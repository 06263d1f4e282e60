//! Detector boundary
//!
//! The inspection pipeline works with any model that can report the labels
//! it knows and list the objects it finds in an RGB image.

use crate::error::VisionError;
use image::RgbImage;
use sitesafe_core::{ClassCatalog, Detection};

/// Common interface for object detectors
pub trait Detector: Send {
    /// Detect objects in a single RGB image. Boxes are in the image's own
    /// pixel coordinates.
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>, VisionError>;

    /// Every label this detector can emit, in class-id order
    fn catalog(&self) -> &ClassCatalog;

    /// Detector name (for logging)
    fn name(&self) -> &str;
}
