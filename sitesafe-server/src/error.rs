//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use sitesafe_eye::VisionError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image uploaded; send a JPEG or PNG file in the 'image' field")]
    MissingImage,

    #[error("Unsupported content type '{0}'; upload a JPEG or PNG image")]
    UnsupportedMediaType(String),

    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Vision(VisionError::Core(sitesafe_core::Error::UnknownClass { .. })) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Vision(e) if e.is_bad_input() => StatusCode::BAD_REQUEST,
            ApiError::Vision(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingImage => "MISSING_IMAGE",
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Vision(VisionError::Core(sitesafe_core::Error::UnknownClass { .. })) => {
                "UNKNOWN_CLASS"
            }
            ApiError::Vision(e) if e.is_bad_input() => "INVALID_IMAGE",
            ApiError::Vision(_) => "INFERENCE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the client. Server faults are logged in
    /// full and reported generically.
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            error!("{} ({})", self, self.code());
            return match self {
                ApiError::Vision(_) => "Inference failed".to_string(),
                _ => "An error occurred".to_string(),
            };
        }
        self.to_string()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.public_message(),
            code: self.code().to_string(),
        });
        (self.status(), body).into_response()
    }
}
