//! # Primitive Validators
//!
//! Stateless checks on scalar values. Every function is pure and returns an
//! [`Outcome`](crate::validation::report::Outcome); lookup tables are
//! immutable statics built on first use.

pub mod dns;
pub mod duration;
pub mod http;
pub mod net;
pub mod scalar;

pub use dns::{
    is_dns1123_label, is_wildcard_dns1123_label, validate_egress_domain, validate_fqdn,
    validate_port_name, validate_subset_name, validate_wildcard_domain,
};
pub use duration::{
    decode_duration, format_span, validate_connect_timeout, validate_duration,
    validate_duration_range, validate_parent_and_drain, validate_refresh_delay,
    validate_required_duration, validate_timestamp,
};
pub use http::{validate_http_header_name, validate_http_method, validate_http_status};
pub use net::{
    validate_cidr, validate_host_or_subnet, validate_ipv4_address, validate_ipv4_subnet,
    validate_port, validate_proxy_address, validate_unix_address, UNIX_ADDRESS_PREFIX,
};
pub use scalar::{validate_float_percent, validate_labels, validate_percent, validate_protocol};
