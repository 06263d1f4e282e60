//! sitesafe-server: web front end for the SiteSafe inspector
//!
//! Serves an upload page that renders an inspection report, plus a JSON
//! API over the same pipeline.

pub mod config;
pub mod error;
pub mod http;
pub mod render;

pub use config::{ConfigError, HttpConfig, LoggingConfig, ServerConfig};
pub use error::{ApiError, ErrorResponse};
pub use http::{create_router, ApiState};
