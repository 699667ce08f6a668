//! Legacy routing resources: route rules, ingress rules, egress rules and
//! destination policies.

use prost_types::Duration;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::common::{AbortErrorType, CorsPolicy, DelayType, HttpRedirect, HttpRewrite, StringMatch};
use super::Labels;

/// Reference to a service, by short name or by fully qualified `service`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IstioService {
    pub name: String,
    pub namespace: String,
    pub domain: String,
    pub service: String,
    pub labels: Labels,
}

impl IstioService {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn service(service: impl Into<String>) -> Self {
        Self { service: service.into(), ..Default::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchCondition {
    pub source: Option<IstioService>,
    pub tcp: Option<L4MatchAttributes>,
    pub udp: Option<L4MatchAttributes>,
    pub request: Option<MatchRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct L4MatchAttributes {
    pub source_subnet: Vec<String>,
    pub destination_subnet: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchRequest {
    pub headers: BTreeMap<String, StringMatch>,
}

/// One weighted backend of a legacy route rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DestinationWeight {
    pub labels: Labels,
    pub weight: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpTimeout {
    pub simple_timeout: Option<SimpleTimeoutPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimpleTimeoutPolicy {
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub timeout: Option<Duration>,
    pub override_header_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpRetry {
    pub simple_retry: Option<SimpleRetryPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimpleRetryPolicy {
    pub attempts: i32,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub per_try_timeout: Option<Duration>,
    pub override_header_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpFaultInjection {
    pub delay: Option<HttpDelay>,
    pub abort: Option<HttpAbort>,
}

/// Delay fault with a float percentage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpDelay {
    pub percent: f32,
    pub override_header_name: String,
    #[serde(flatten)]
    pub delay_type: Option<DelayType>,
}

/// Abort fault with a float percentage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpAbort {
    pub percent: f32,
    pub override_header_name: String,
    #[serde(flatten)]
    pub error_type: Option<AbortErrorType>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct L4FaultInjection {
    pub throttle: Option<Throttle>,
    pub terminate: Option<Terminate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Throttle {
    pub percent: f32,
    pub downstream_limit_bps: i64,
    pub upstream_limit_bps: i64,
    #[serde(flatten)]
    pub throttle_after: Option<ThrottleAfter>,
}

/// When a throttle kicks in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThrottleAfter {
    #[serde(deserialize_with = "crate::domain::wire::duration")]
    ThrottleAfterPeriod(Duration),
    ThrottleAfterBytes(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Terminate {
    pub percent: f32,
}

/// Legacy HTTP/TCP route rule.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteRule {
    pub destination: Option<IstioService>,
    pub precedence: i32,
    #[serde(rename = "match")]
    pub match_: Option<MatchCondition>,
    pub route: Vec<DestinationWeight>,
    pub redirect: Option<HttpRedirect>,
    pub rewrite: Option<HttpRewrite>,
    pub websocket_upgrade: bool,
    pub http_req_timeout: Option<HttpTimeout>,
    pub http_req_retries: Option<HttpRetry>,
    pub http_fault: Option<HttpFaultInjection>,
    pub l4_fault: Option<L4FaultInjection>,
    pub mirror: Option<IstioService>,
    pub cors_policy: Option<CorsPolicy>,
    pub append_headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IngressRule {
    pub destination: Option<IstioService>,
    pub port: Option<super::PortSelector>,
    pub tls_secret: String,
    pub precedence: i32,
    #[serde(rename = "match")]
    pub match_: Option<MatchCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EgressRule {
    pub destination: Option<IstioService>,
    pub ports: Vec<EgressPort>,
    pub use_egress_proxy: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EgressPort {
    pub port: i32,
    pub protocol: String,
}

impl EgressPort {
    pub fn new(port: i32, protocol: impl Into<String>) -> Self {
        Self { port, protocol: protocol.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DestinationPolicy {
    pub destination: Option<IstioService>,
    pub source: Option<IstioService>,
    pub load_balancing: Option<LoadBalancing>,
    pub circuit_breaker: Option<CircuitBreaker>,
}

/// Load balancing choice. The policy is a oneof and may be unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoadBalancing {
    #[serde(flatten)]
    pub lb_policy: Option<LbPolicy>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LbPolicy {
    Name(SimpleLbPolicy),
    Custom(serde_json::Value),
}

proto_enum! {
    pub enum SimpleLbPolicy {
        RoundRobin => "ROUND_ROBIN",
        LeastConn => "LEAST_CONN",
        Random => "RANDOM",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircuitBreaker {
    pub simple_cb: Option<SimpleCircuitBreakerPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimpleCircuitBreakerPolicy {
    pub max_connections: i32,
    pub http_max_pending_requests: i32,
    pub http_max_requests: i32,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub sleep_window: Option<Duration>,
    pub http_consecutive_errors: i32,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub http_detection_interval: Option<Duration>,
    pub http_max_requests_per_connection: i32,
    pub http_max_ejection_percent: i32,
}
