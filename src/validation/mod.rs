//! # Validation Module
//!
//! Semantic validation of service-mesh configuration resources before they
//! are admitted to a configuration store.
//!
//! Layers, from the bottom up:
//! 1. `primitives`: pure checks on scalars (ports, DNS names, CIDRs, durations)
//! 2. `report`: violations and the collect-all accumulator
//! 3. `resources`: one validator per resource kind, built from the two above
//! 4. `registry`: dispatch from a resource kind tag to its validator
//!
//! `descriptor` checks the schema list itself and `service_model` checks the
//! registry's service and endpoint model.
//!
//! Validators never stop at the first problem. Every independent invariant is
//! checked and all violations come back together; only a payload of the wrong
//! kind ends a call early.

pub mod descriptor;
pub mod primitives;
pub mod registry;
pub mod report;
pub mod resources;
pub mod service_model;

pub use descriptor::{ConfigDescriptor, ConfigSchema};
pub use registry::{validate_config, validator_for, ConfigSpec, ResourceKind, ValidateFn};
pub use report::{append_errors, ErrorCollector, Outcome, OutcomeExt, Violation, ViolationKind, Violations};
pub use service_model::validate_network_endpoint_address;
