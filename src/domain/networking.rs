//! Networking resources: gateways, virtual services, destination rules and
//! service entries.

use prost_types::Duration;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::common::{
    AbortErrorType, CorsPolicy, DelayType, HttpRedirect, HttpRewrite, PortSelector, StringMatch,
};
use super::Labels;

/// Name of the implicit gateway that represents every sidecar in the mesh.
pub const MESH_GATEWAY: &str = "mesh";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Gateway {
    pub servers: Vec<Server>,
    pub selector: Labels,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Server {
    pub port: Option<Port>,
    pub hosts: Vec<String>,
    pub tls: Option<ServerTlsOptions>,
}

/// A named, numbered port carrying a protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Port {
    pub number: u32,
    pub protocol: String,
    pub name: String,
}

impl Port {
    pub fn new(number: u32, protocol: impl Into<String>, name: impl Into<String>) -> Self {
        Self { number, protocol: protocol.into(), name: name.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerTlsOptions {
    pub https_redirect: bool,
    pub mode: ServerTlsMode,
    pub server_certificate: String,
    pub private_key: String,
    pub ca_certificates: String,
    pub subject_alt_names: Vec<String>,
}

proto_enum! {
    /// How a gateway server terminates TLS.
    pub enum ServerTlsMode {
        Passthrough => "PASSTHROUGH",
        Simple => "SIMPLE",
        Mutual => "MUTUAL",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DestinationRule {
    pub host: String,
    pub traffic_policy: Option<TrafficPolicy>,
    pub subsets: Vec<Subset>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrafficPolicy {
    pub load_balancer: Option<LoadBalancerSettings>,
    pub connection_pool: Option<ConnectionPoolSettings>,
    pub outlier_detection: Option<OutlierDetection>,
    pub tls: Option<TlsSettings>,
}

impl TrafficPolicy {
    pub fn is_empty(&self) -> bool {
        self.load_balancer.is_none()
            && self.connection_pool.is_none()
            && self.outlier_detection.is_none()
            && self.tls.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoadBalancerSettings {
    #[serde(flatten)]
    pub lb_policy: Option<LoadBalancerPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadBalancerPolicy {
    Simple(SimpleLb),
    ConsistentHash(ConsistentHashLb),
}

proto_enum! {
    pub enum SimpleLb {
        RoundRobin => "ROUND_ROBIN",
        LeastConn => "LEAST_CONN",
        Random => "RANDOM",
        Passthrough => "PASSTHROUGH",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsistentHashLb {
    pub http_header: String,
    pub minimum_ring_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConnectionPoolSettings {
    pub tcp: Option<TcpSettings>,
    pub http: Option<HttpSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TcpSettings {
    pub max_connections: i32,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub connect_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpSettings {
    pub http1_max_pending_requests: i32,
    pub http2_max_requests: i32,
    pub max_requests_per_connection: i32,
    pub max_retries: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutlierDetection {
    pub consecutive_errors: i32,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub interval: Option<Duration>,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub base_ejection_time: Option<Duration>,
    pub max_ejection_percent: i32,
}

/// Client-side TLS towards an upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TlsSettings {
    pub mode: TlsMode,
    pub client_certificate: String,
    pub private_key: String,
    pub ca_certificates: String,
    pub subject_alt_names: Vec<String>,
    pub sni: String,
}

proto_enum! {
    pub enum TlsMode {
        Disable => "DISABLE",
        Simple => "SIMPLE",
        Mutual => "MUTUAL",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Subset {
    pub name: String,
    pub labels: Labels,
    pub traffic_policy: Option<TrafficPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VirtualService {
    pub hosts: Vec<String>,
    pub gateways: Vec<String>,
    pub http: Vec<HttpRoute>,
    pub tcp: Vec<TcpRoute>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpRoute {
    #[serde(rename = "match")]
    pub match_: Vec<HttpMatchRequest>,
    pub route: Vec<DestinationWeight>,
    pub redirect: Option<HttpRedirect>,
    pub rewrite: Option<HttpRewrite>,
    pub websocket_upgrade: bool,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub timeout: Option<Duration>,
    pub retries: Option<HttpRetry>,
    pub fault: Option<HttpFaultInjection>,
    pub mirror: Option<Destination>,
    pub cors_policy: Option<CorsPolicy>,
    pub append_headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpMatchRequest {
    pub uri: Option<StringMatch>,
    pub scheme: Option<StringMatch>,
    pub method: Option<StringMatch>,
    pub authority: Option<StringMatch>,
    pub headers: BTreeMap<String, StringMatch>,
    pub port: u32,
    pub source_labels: Labels,
    pub gateways: Vec<String>,
}

/// An upstream service, optionally narrowed to a subset and port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Destination {
    pub host: String,
    pub subset: String,
    pub port: Option<PortSelector>,
}

impl Destination {
    pub fn host(host: impl Into<String>) -> Self {
        Self { host: host.into(), ..Default::default() }
    }
}

/// One weighted backend of an HTTP or TCP route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DestinationWeight {
    pub destination: Option<Destination>,
    pub weight: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpRetry {
    pub attempts: i32,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub per_try_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpFaultInjection {
    pub delay: Option<Delay>,
    pub abort: Option<Abort>,
}

/// Delay fault with an integer percentage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Delay {
    pub percent: i32,
    #[serde(flatten)]
    pub delay_type: Option<DelayType>,
}

/// Abort fault with an integer percentage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Abort {
    pub percent: i32,
    #[serde(flatten)]
    pub error_type: Option<AbortErrorType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TcpRoute {
    #[serde(rename = "match")]
    pub match_: Vec<L4MatchAttributes>,
    pub route: Vec<DestinationWeight>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct L4MatchAttributes {
    pub destination_subnets: Vec<String>,
    pub port: u32,
    pub source_labels: Labels,
    pub gateways: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceEntry {
    pub hosts: Vec<String>,
    pub addresses: Vec<String>,
    pub ports: Vec<Port>,
    pub location: Location,
    pub resolution: Resolution,
    pub endpoints: Vec<Endpoint>,
}

proto_enum! {
    pub enum Location {
        MeshExternal => "MESH_EXTERNAL",
        MeshInternal => "MESH_INTERNAL",
    }
}

proto_enum! {
    /// How the endpoints backing a service entry are discovered.
    pub enum Resolution {
        None => "NONE",
        Static => "STATIC",
        Dns => "DNS",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    pub address: String,
    pub ports: BTreeMap<String, u32>,
    pub labels: Labels,
}

impl Endpoint {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into(), ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_reads_servers_and_tls() {
        let gateway: Gateway = serde_yaml::from_str(
            r#"
servers:
  - port: {number: 443, protocol: HTTPS, name: https}
    hosts: ["*.example.com"]
    tls:
      mode: MUTUAL
      serverCertificate: /etc/certs/server.pem
"#,
        )
        .unwrap();
        let server = &gateway.servers[0];
        assert_eq!(server.port, Some(Port::new(443, "HTTPS", "https")));
        let tls = server.tls.as_ref().unwrap();
        assert_eq!(tls.mode, ServerTlsMode::Mutual);
        assert!(tls.ca_certificates.is_empty());
    }

    #[test]
    fn resolution_defaults_to_none() {
        let entry: ServiceEntry = serde_json::from_str(r#"{"hosts": ["api.example.com"]}"#).unwrap();
        assert_eq!(entry.resolution, Resolution::None);
        let entry: ServiceEntry = serde_json::from_str(r#"{"resolution": "SRV"}"#).unwrap();
        assert_eq!(entry.resolution, Resolution::Unrecognized("SRV".into()));
    }

    #[test]
    fn virtual_service_reads_match_and_fault() {
        let vs: VirtualService = serde_yaml::from_str(
            r#"
hosts: [reviews]
http:
  - match:
      - headers:
          cookie: {regex: "^(.*?;)?(user=jason)(;.*)?$"}
    fault:
      abort: {percent: 10, httpStatus: 400}
    route:
      - destination: {host: reviews, subset: v1, port: {number: 9080}}
"#,
        )
        .unwrap();
        let route = &vs.http[0];
        assert_eq!(route.match_[0].headers["cookie"], StringMatch::regex("^(.*?;)?(user=jason)(;.*)?$"));
        let abort = route.fault.as_ref().and_then(|f| f.abort.clone()).unwrap();
        assert_eq!(abort.error_type, Some(AbortErrorType::HttpStatus(400)));
        let destination = route.route[0].destination.as_ref().unwrap();
        assert_eq!(destination.port, Some(PortSelector::number(9080)));
    }

    #[test]
    fn empty_traffic_policy_is_detected() {
        assert!(TrafficPolicy::default().is_empty());
        let policy = TrafficPolicy { tls: Some(TlsSettings::default()), ..Default::default() };
        assert!(!policy.is_empty());
    }
}
