//! Per-resource validators.
//!
//! Each validator takes the typed resource and returns every violation it
//! finds. Shared checks live in `helpers`.

mod authn;
mod destination_policy;
mod destination_rule;
mod egress;
mod gateway;
mod helpers;
mod mesh;
mod mixer;
mod rbac;
mod route_rule;
mod service_entry;
mod virtual_service;

pub use authn::{parse_jwks_uri, validate_authentication_policy, validate_jwt, JwksEndpoint};
pub use destination_policy::{
    validate_circuit_breaker, validate_destination_policy, validate_load_balancing,
};
pub use destination_rule::{
    validate_connection_pool, validate_destination_rule, validate_load_balancer,
    validate_outlier_detection, validate_subset, validate_tls, validate_traffic_policy,
};
pub use egress::{validate_egress_rule, validate_egress_rule_port, validate_egress_rule_service};
pub use gateway::{
    validate_gateway, validate_server, validate_server_port, validate_server_tls_options,
};
pub use mesh::{validate_mesh_config, validate_proxy_config};
pub use mixer::{
    validate_http_api_spec, validate_http_api_spec_binding, validate_mixer_attributes,
    validate_quota_spec, validate_quota_spec_binding,
};
pub use rbac::{validate_rbac_config, validate_service_role, validate_service_role_binding};
pub use route_rule::{
    validate_abort, validate_delay, validate_destination_weight, validate_http_fault,
    validate_http_retries, validate_http_timeout, validate_ingress_rule, validate_istio_service,
    validate_l4_fault, validate_l4_match_attributes, validate_match_condition,
    validate_route_rule, validate_terminate, validate_throttle, validate_weights, HEADER_URI,
};
pub use service_entry::validate_service_entry;
pub use virtual_service::{
    validate_destination, validate_http_fault_injection, validate_http_route,
    validate_tcp_route, validate_virtual_service,
};
