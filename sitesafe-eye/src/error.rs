//! Error types for sitesafe-eye

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("ONNX Runtime error: {0}")]
    Ort(String),

    #[error(transparent)]
    Core(#[from] sitesafe_core::Error),
}

impl VisionError {
    pub fn ort(err: impl std::fmt::Display) -> Self {
        VisionError::Ort(err.to_string())
    }

    /// True when the upload itself was at fault rather than the model
    pub fn is_bad_input(&self) -> bool {
        matches!(self, VisionError::Image(_) | VisionError::Processing(_))
    }
}
