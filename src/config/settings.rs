//! # Configuration Settings
//!
//! Defines the configuration structure for the meshguard CLI.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{DEFAULT_CONFIG_FILE, ENV_PREFIX};
use crate::errors::{MeshguardError, Result};
use crate::validation::primitives::is_dns1123_label;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Report configuration
    #[validate(nested)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load settings from the default file (if present) and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from `path`, or from `meshguard.yaml` in the working
    /// directory when no path is given. An explicit path must exist.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: AppConfig = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(MeshguardError::from)?;
        self.validate_custom()
    }

    /// Checks that go beyond what the validator crate can express
    fn validate_custom(&self) -> Result<()> {
        let namespace = &self.output.default_namespace;
        if !namespace.is_empty() && !is_dns1123_label(namespace) {
            return Err(MeshguardError::Settings {
                message: format!("default namespace {:?} must be a valid label", namespace),
            });
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "validate_log_level"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logging: false,
        }
    }
}

fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("log_level");
        error.message = Some("Log level must be one of trace, debug, info, warn, error".into());
        Err(error)
    }
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Format used when `--format` is not given
    pub format: OutputFormat,

    /// Namespace assigned to documents that carry none
    #[validate(length(max = 63, message = "Default namespace must be at most 63 characters"))]
    pub default_namespace: String,
}
