//! Mesh-wide settings and per-proxy bootstrap settings.

use prost_types::Duration;
use serde::Deserialize;

use super::wire::seconds;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshConfig {
    pub mixer_check_server: String,
    pub mixer_report_server: String,
    pub disable_policy_checks: bool,
    pub proxy_listen_port: i32,
    pub proxy_http_port: i32,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub connect_timeout: Option<Duration>,
    pub ingress_class: String,
    pub ingress_service: String,
    pub auth_policy: MeshAuthPolicy,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub rds_refresh_delay: Option<Duration>,
    pub enable_tracing: bool,
    pub access_log_file: String,
    pub default_config: Option<ProxyConfig>,
}

proto_enum! {
    /// Mesh-wide service-to-service authentication.
    pub enum MeshAuthPolicy {
        None => "NONE",
        MutualTls => "MUTUAL_TLS",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyConfig {
    pub config_path: String,
    pub binary_path: String,
    pub service_cluster: String,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub drain_duration: Option<Duration>,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub parent_shutdown_duration: Option<Duration>,
    pub discovery_address: String,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub discovery_refresh_delay: Option<Duration>,
    pub zipkin_address: String,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub connect_timeout: Option<Duration>,
    pub statsd_udp_address: String,
    pub proxy_admin_port: i32,
    pub availability_zone: String,
    pub control_plane_auth_policy: AuthenticationPolicy,
    pub custom_config_file: String,
}

proto_enum! {
    /// Authentication between proxies and the control plane.
    pub enum AuthenticationPolicy {
        None => "NONE",
        MutualTls => "MUTUAL_TLS",
    }
}

impl MeshConfig {
    /// Mesh settings a control plane starts from when none are supplied.
    pub fn with_defaults() -> Self {
        Self {
            proxy_listen_port: 15001,
            connect_timeout: Some(seconds(1)),
            ingress_class: "istio".to_string(),
            ingress_service: "istio-ingress".to_string(),
            auth_policy: MeshAuthPolicy::None,
            rds_refresh_delay: Some(seconds(1)),
            enable_tracing: true,
            access_log_file: "/dev/stdout".to_string(),
            default_config: Some(ProxyConfig::with_defaults()),
            ..Default::default()
        }
    }
}

impl ProxyConfig {
    pub fn with_defaults() -> Self {
        Self {
            config_path: "/etc/istio/proxy".to_string(),
            binary_path: "/usr/local/bin/envoy".to_string(),
            service_cluster: "istio-proxy".to_string(),
            drain_duration: Some(seconds(2)),
            parent_shutdown_duration: Some(seconds(3)),
            discovery_address: "istio-pilot:15007".to_string(),
            discovery_refresh_delay: Some(seconds(1)),
            connect_timeout: Some(seconds(1)),
            proxy_admin_port: 15000,
            control_plane_auth_policy: AuthenticationPolicy::None,
            ..Default::default()
        }
    }
}
