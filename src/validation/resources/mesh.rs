//! Mesh-wide settings and proxy bootstrap settings.

use crate::domain::mesh::{AuthenticationPolicy, MeshAuthPolicy, MeshConfig, ProxyConfig};
use crate::validation::primitives::{
    validate_connect_timeout, validate_parent_and_drain, validate_port, validate_proxy_address,
    validate_refresh_delay,
};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

/// Validate mesh-wide settings, including the default proxy config.
pub fn validate_mesh_config(mesh: &MeshConfig) -> Outcome {
    let mut errors = ErrorCollector::new();

    if !mesh.mixer_check_server.is_empty() {
        errors.check_with_prefix(
            "invalid Policy Check Server address:",
            validate_proxy_address(&mesh.mixer_check_server),
        );
    }
    if !mesh.mixer_report_server.is_empty() {
        errors.check_with_prefix(
            "invalid Telemetry Server address:",
            validate_proxy_address(&mesh.mixer_report_server),
        );
    }

    errors.check_with_prefix(
        "invalid proxy listen port:",
        validate_port(i64::from(mesh.proxy_listen_port)),
    );
    errors.check_with_prefix(
        "invalid connect timeout:",
        validate_connect_timeout(mesh.connect_timeout.as_ref()),
    );

    if let MeshAuthPolicy::Unrecognized(policy) = &mesh.auth_policy {
        errors.push(Violation::format(format!("unrecognized auth policy {:?}", policy)));
    }

    errors.check_with_prefix(
        "invalid refresh delay:",
        validate_refresh_delay(mesh.rds_refresh_delay.as_ref()),
    );

    match &mesh.default_config {
        Some(proxy) => errors.check(validate_proxy_config(proxy)),
        None => errors.push(Violation::required("missing default config")),
    }

    errors.finish()
}

/// Validate the bootstrap settings of one proxy.
pub fn validate_proxy_config(config: &ProxyConfig) -> Outcome {
    let mut errors = ErrorCollector::new();

    if config.config_path.is_empty() {
        errors.push(Violation::required("config path must be set"));
    }
    if config.binary_path.is_empty() {
        errors.push(Violation::required("binary path must be set"));
    }
    if config.service_cluster.is_empty() {
        errors.push(Violation::required("service cluster must be set"));
    }

    errors.check_with_prefix(
        "invalid parent and drain time combination:",
        validate_parent_and_drain(
            config.drain_duration.as_ref(),
            config.parent_shutdown_duration.as_ref(),
        ),
    );
    errors.check_with_prefix(
        "invalid refresh delay:",
        validate_refresh_delay(config.discovery_refresh_delay.as_ref()),
    );

    // mutual TLS relies on CDS, so the discovery service is mandatory
    if config.discovery_address.is_empty() {
        errors.push(Violation::required(
            "discovery address must be set to the proxy discovery service",
        ));
    } else {
        errors.check_with_prefix(
            "invalid discovery address:",
            validate_proxy_address(&config.discovery_address),
        );
    }

    if !config.zipkin_address.is_empty() {
        errors.check_with_prefix(
            "invalid zipkin address:",
            validate_proxy_address(&config.zipkin_address),
        );
    }

    errors.check_with_prefix(
        "invalid connect timeout:",
        validate_connect_timeout(config.connect_timeout.as_ref()),
    );

    if !config.statsd_udp_address.is_empty() {
        errors.check_with_prefix(
            &format!("invalid statsd udp address {:?}:", config.statsd_udp_address),
            validate_proxy_address(&config.statsd_udp_address),
        );
    }

    errors.check_with_prefix(
        "invalid proxy admin port:",
        validate_port(i64::from(config.proxy_admin_port)),
    );

    if let AuthenticationPolicy::Unrecognized(policy) = &config.control_plane_auth_policy {
        errors.push(Violation::format(format!(
            "unrecognized control plane auth policy {:?}",
            policy
        )));
    }

    errors.finish()
}
