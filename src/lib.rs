//! # meshguard
//!
//! Configuration validation engine for service-mesh control planes. Given a
//! parsed resource of a known kind (routing rule, gateway, destination
//! policy, service entry, authentication policy, RBAC role, quota spec,
//! mesh-wide settings and so on), meshguard decides whether it is internally
//! consistent and semantically legal before it is admitted to a
//! configuration store and pushed to proxies.
//!
//! ## Architecture
//!
//! ```text
//! ConfigDocument → ConfigSpec → registry → per-resource validator
//!                                               ↓
//!                                   primitives + ErrorCollector → Outcome
//! ```
//!
//! ## Core Components
//!
//! - **domain**: typed resource shapes, decoded from camelCase YAML/JSON
//! - **validation**: primitive checks, per-resource validators, dispatch
//! - **document**: reading YAML/JSON documents into typed resources
//! - **cli**: the `meshguard` command
//!
//! ## Example Usage
//!
//! ```rust
//! use meshguard::domain::networking::{Gateway, Port, Server};
//! use meshguard::validation::{validate_config, ConfigSpec, ResourceKind};
//!
//! let server = Server {
//!     port: Some(Port::new(80, "HTTP", "http")),
//!     hosts: vec!["*.example.com".into()],
//!     tls: None,
//! };
//! let gateway = Gateway { servers: vec![server.clone(), server], ..Default::default() };
//!
//! let violations = validate_config(
//!     ResourceKind::Gateway,
//!     "ingress",
//!     "istio-system",
//!     &ConfigSpec::Gateway(gateway),
//! )
//! .unwrap_err();
//! assert_eq!(
//!     violations.messages(),
//!     vec!["port names in servers must be unique: duplicate name http"]
//! );
//! ```

pub mod cli;
pub mod config;
pub mod document;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod validation;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use document::{load_documents, ConfigDocument};
pub use errors::{MeshguardError, Result};
pub use validation::{validate_config, ConfigSpec, Outcome, ResourceKind, Violation, Violations};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
