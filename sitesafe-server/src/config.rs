//! Server configuration
//!
//! Resolution order: defaults, then a config file (JSON, TOML or YAML),
//! then `SITESAFE_*` environment variables, then command-line flags.

use serde::{Deserialize, Serialize};
use sitesafe_eye::VisionConfig;
use std::path::Path;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Largest upload the server will ever accept, whatever the config says
const MAX_UPLOAD_CEILING: usize = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_address: String,
    pub port: u16,
    /// Largest accepted image, excluding the multipart envelope
    pub max_upload_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `sitesafe_eye=debug,info`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http: HttpConfig,
    pub vision: VisionConfig,
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Load configuration from string, trying JSON, TOML and YAML in turn
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        if let Ok(config) = serde_json::from_str::<ServerConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = toml::from_str::<ServerConfig>(content) {
            return Ok(config);
        }

        match serde_yaml::from_str::<ServerConfig>(content) {
            Ok(config) => Ok(config),
            Err(e) => Err(ConfigError::ParseError(format!(
                "not valid JSON, TOML or YAML ({})",
                e
            ))),
        }
    }

    /// Apply `SITESAFE_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SITESAFE_PORT") {
            self.http.port = port.trim().parse().map_err(|_| {
                ConfigError::ParseError(format!("SITESAFE_PORT is not a port number: '{}'", port))
            })?;
        }

        if let Some(host) = lookup("SITESAFE_HOST") {
            self.http.bind_address = host;
        }

        if let Some(model) = lookup("SITESAFE_MODEL") {
            self.vision.model_path = model.into();
        }

        if let Some(level) = lookup("SITESAFE_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.bind_address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "http.bind_address must not be empty".to_string(),
            ));
        }

        if self.http.max_upload_bytes == 0 || self.http.max_upload_bytes > MAX_UPLOAD_CEILING {
            return Err(ConfigError::ValidationError(format!(
                "http.max_upload_bytes must be between 1 and {}",
                MAX_UPLOAD_CEILING
            )));
        }

        EnvFilter::try_new(&self.logging.level).map_err(|e| {
            ConfigError::ValidationError(format!(
                "logging.level '{}' is not a valid filter: {}",
                self.logging.level, e
            ))
        })?;

        self.vision
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
