//! # Observability Infrastructure
//!
//! Structured logging for the meshguard CLI. Library code only emits
//! `tracing` events; installing a subscriber is left to the binary.

pub mod logging;

pub use logging::{init_logging, log_config_info, resolve_filter};
