//! # Configuration Management
//!
//! Settings for the meshguard CLI, layered from an optional YAML file,
//! `MESHGUARD__*` environment variables and command-line overrides.

pub mod settings;

pub use settings::{AppConfig, ObservabilityConfig, OutputConfig, OutputFormat};

/// File consulted when no explicit settings path is given.
pub const DEFAULT_CONFIG_FILE: &str = "meshguard.yaml";

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "MESHGUARD";
