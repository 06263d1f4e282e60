//! Letterbox preprocessing for YOLO input

use crate::error::VisionError;
use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;
use sitesafe_core::BoundingBox;

/// Gray used by Ultralytics for letterbox padding
const PAD_VALUE: f32 = 114.0 / 255.0;

/// Geometry of one letterbox transform, needed to map boxes back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub input_width: u32,
    pub input_height: u32,
}

impl Letterbox {
    /// Compute the transform that fits `(width, height)` into `(input_width, input_height)`
    pub fn fit(width: u32, height: u32, input_width: u32, input_height: u32) -> Result<Self, VisionError> {
        if width == 0 || height == 0 {
            return Err(VisionError::Processing("image has zero size".to_string()));
        }
        if input_width == 0 || input_height == 0 {
            return Err(VisionError::Processing("model input size has zero size".to_string()));
        }

        let scale = (input_width as f32 / width as f32).min(input_height as f32 / height as f32);
        let (new_w, new_h) = scaled_size(width, height, scale, input_width, input_height);

        Ok(Self {
            scale,
            pad_x: ((input_width - new_w) / 2) as f32,
            pad_y: ((input_height - new_h) / 2) as f32,
            input_width,
            input_height,
        })
    }

    /// Map a box from model-input space back to the original image
    pub fn to_original(&self, bbox: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            (bbox.x - self.pad_x) / self.scale,
            (bbox.y - self.pad_y) / self.scale,
            bbox.width / self.scale,
            bbox.height / self.scale,
        )
    }
}

fn scaled_size(width: u32, height: u32, scale: f32, max_w: u32, max_h: u32) -> (u32, u32) {
    let new_w = ((width as f32 * scale).round() as u32).clamp(1, max_w);
    let new_h = ((height as f32 * scale).round() as u32).clamp(1, max_h);
    (new_w, new_h)
}

/// Resize with preserved aspect ratio, pad, and lay out as a normalized
/// `[1, 3, H, W]` tensor.
pub fn letterbox(
    image: &RgbImage,
    input_width: u32,
    input_height: u32,
) -> Result<(Array4<f32>, Letterbox), VisionError> {
    let geometry = Letterbox::fit(image.width(), image.height(), input_width, input_height)?;
    let (new_w, new_h) = scaled_size(
        image.width(),
        image.height(),
        geometry.scale,
        input_width,
        input_height,
    );

    let resized = if (new_w, new_h) == image.dimensions() {
        image.clone()
    } else {
        imageops::resize(image, new_w, new_h, FilterType::Triangle)
    };

    let mut tensor = Array4::from_elem(
        (1, 3, input_height as usize, input_width as usize),
        PAD_VALUE,
    );
    let offset_x = geometry.pad_x as usize;
    let offset_y = geometry.pad_y as usize;

    for (x, y, pixel) in resized.enumerate_pixels() {
        let tx = x as usize + offset_x;
        let ty = y as usize + offset_y;
        for c in 0..3 {
            tensor[[0, c, ty, tx]] = pixel[c] as f32 / 255.0;
        }
    }

    Ok((tensor, geometry))
}
