//! Domain layer
//!
//! Typed shapes of the configuration resources the validation engine inspects.
//! These are plain data: no validation logic lives here, and nothing in this
//! module performs I/O. Every shape deserializes from the camelCase document
//! form used by the control plane (proto3 JSON durations such as `"1.5s"`,
//! RFC 3339 timestamps), but callers are free to build them directly.
//!
//! ## Module Organization
//!
//! - `enums`: string-backed proto enums that keep unknown values
//! - `common`: shapes shared by several API generations (string matches, CORS, faults)
//! - `hostname`: hostnames with wildcard matching
//! - `protocol`: the protocol name table
//! - `routing`: legacy route, ingress, egress rules and destination policies
//! - `networking`: gateways, virtual services, destination rules, service entries
//! - `mesh`: mesh-wide and proxy settings
//! - `mixer`: HTTP API specs, quota specs, bindings and attribute bags
//! - `authn`: authentication policies
//! - `rbac`: service roles, bindings and the RBAC switch
//! - `service`: the registry's service and endpoint model

#[macro_use]
mod enums;

pub mod authn;
pub mod common;
pub mod hostname;
pub mod mesh;
pub mod mixer;
pub mod networking;
pub mod protocol;
pub mod rbac;
pub mod routing;
pub mod service;
pub mod wire;

use std::collections::BTreeMap;

/// Unordered key/value tags attached to workloads and subsets.
///
/// A `BTreeMap` keeps iteration (and therefore violation order) deterministic.
pub type Labels = BTreeMap<String, String>;

pub use common::{
    AbortErrorType, CorsPolicy, DelayType, HttpRedirect, HttpRewrite, PortSelector,
    PortSelectorValue, StringMatch, StringMatchType,
};
pub use hostname::Hostname;
pub use protocol::Protocol;
