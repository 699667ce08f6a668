//! # Structured Logging
//!
//! Subscriber setup on top of `tracing-subscriber`. The filter comes from
//! `RUST_LOG` when set, otherwise from `--verbose` or the configured level.
//! Logs go to stderr so that reports on stdout stay machine-readable.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{MeshguardError, Result};

/// Filter directive for the current run.
pub fn resolve_filter(config: &ObservabilityConfig, verbose: bool) -> String {
    if let Ok(directives) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !directives.trim().is_empty() {
            return directives;
        }
    }
    if verbose {
        "debug".to_string()
    } else {
        config.log_level.to_ascii_lowercase()
    }
}

/// Install the global subscriber. Returns `Ok` without changes when one is
/// already installed (e.g. by a test harness).
pub fn init_logging(config: &ObservabilityConfig, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_new(resolve_filter(config, verbose))
        .map_err(|e| MeshguardError::config_with_source("Invalid log filter", Box::new(e)))?;

    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false);
    if config.json_logging {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
    Ok(())
}

/// Log the effective settings at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::debug!(
        log_level = %config.observability.log_level,
        json_logging = config.observability.json_logging,
        output_format = %config.output.format,
        default_namespace = %config.output.default_namespace,
        "meshguard configuration"
    );
}
