use std::collections::HashSet;

use crate::domain::networking::{Gateway, Port, Server, ServerTlsMode, ServerTlsOptions};
use crate::domain::protocol::GATEWAY_PROTOCOLS;
use crate::domain::Protocol;
use crate::validation::primitives::{validate_host_or_subnet, validate_labels, validate_port};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

/// Validate a gateway: its servers, and port names unique across them.
pub fn validate_gateway(gateway: &Gateway) -> Outcome {
    let mut errors = ErrorCollector::new();

    if gateway.servers.is_empty() {
        errors.push(Violation::required("gateway must have at least one server"));
    }
    for server in &gateway.servers {
        errors.check(validate_server(server));
    }

    let mut port_names = HashSet::new();
    for port in gateway.servers.iter().filter_map(|server| server.port.as_ref()) {
        if !port_names.insert(port.name.as_str()) {
            errors.push(Violation::uniqueness(format!(
                "port names in servers must be unique: duplicate name {}",
                port.name
            )));
        }
    }

    errors.check(validate_labels(&gateway.selector));
    errors.finish()
}

pub fn validate_server(server: &Server) -> Outcome {
    let mut errors = ErrorCollector::new();

    if server.hosts.is_empty() {
        errors.push(Violation::required("server config must contain at least one host"));
    }
    for host in &server.hosts {
        errors.check(validate_host_or_subnet(host));
    }

    errors.check(validate_server_port(server.port.as_ref()));
    if let Some(tls) = &server.tls {
        errors.check(validate_server_tls_options(tls));
    }

    errors.finish()
}

pub fn validate_server_port(port: Option<&Port>) -> Outcome {
    let Some(port) = port else {
        return Violation::required("port is required").fail();
    };

    let mut errors = ErrorCollector::new();
    if Protocol::parse(&port.protocol) == Protocol::Unsupported {
        errors.push(Violation::format(format!(
            "invalid protocol {:?}, supported protocols are {}",
            port.protocol, GATEWAY_PROTOCOLS
        )));
    }
    if port.number > 0 {
        errors.check(validate_port(i64::from(port.number)));
    }
    if port.name.is_empty() {
        errors.push(Violation::required("port name must be set"));
    }
    errors.finish()
}

pub fn validate_server_tls_options(tls: &ServerTlsOptions) -> Outcome {
    let mut errors = ErrorCollector::new();
    match &tls.mode {
        ServerTlsMode::Simple => {
            if tls.server_certificate.is_empty() {
                errors.push(Violation::mode_dependent(
                    "SIMPLE TLS requires a server certificate",
                ));
            }
        }
        ServerTlsMode::Mutual => {
            if tls.server_certificate.is_empty() {
                errors.push(Violation::mode_dependent(
                    "MUTUAL TLS requires a server certificate",
                ));
            }
            if tls.ca_certificates.is_empty() {
                errors.push(Violation::mode_dependent(
                    "MUTUAL TLS requires a client CA bundle",
                ));
            }
        }
        ServerTlsMode::Passthrough => {}
        ServerTlsMode::Unrecognized(mode) => {
            errors.push(Violation::format(format!("unrecognized TLS mode {:?}", mode)));
        }
    }
    errors.finish()
}
