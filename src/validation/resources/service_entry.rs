use std::collections::HashSet;

use crate::domain::networking::{Endpoint, Resolution, ServiceEntry};
use crate::validation::primitives::{
    validate_cidr, validate_fqdn, validate_ipv4_address, validate_labels, validate_port,
    validate_port_name, validate_protocol, validate_unix_address, validate_wildcard_domain,
    UNIX_ADDRESS_PREFIX,
};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

/// Validate a service entry. Endpoint rules depend on the resolution mode.
pub fn validate_service_entry(entry: &ServiceEntry) -> Outcome {
    let mut errors = ErrorCollector::new();

    if entry.hosts.is_empty() {
        errors.push(Violation::required("service entry must have at least one host"));
    }
    for host in &entry.hosts {
        // full wildcards and short names are not allowed
        if host == "*" || !host.contains('.') {
            errors.push(Violation::format(format!("invalid host {}", host)));
        } else {
            errors.check(validate_wildcard_domain(host));
        }
    }
    for address in &entry.addresses {
        errors.check(validate_cidr(address));
    }

    let mut port_names = HashSet::new();
    let mut port_numbers = HashSet::new();
    for port in &entry.ports {
        if !port_names.insert(port.name.as_str()) {
            errors.push(Violation::uniqueness(format!(
                "service entry port name {:?} already defined",
                port.name
            )));
        }
        if !port_numbers.insert(port.number) {
            errors.push(Violation::uniqueness(format!(
                "service entry port {} already defined",
                port.number
            )));
        }
    }

    match &entry.resolution {
        Resolution::None => {
            if !entry.endpoints.is_empty() {
                errors.push(Violation::mode_dependent(
                    "no endpoints should be provided for discovery type none",
                ));
            }
        }
        Resolution::Static => {
            if entry.endpoints.is_empty() {
                errors.push(Violation::mode_dependent(
                    "endpoints must be provided if service entry discovery mode is static",
                ));
            }

            let mut unix_endpoint = false;
            for endpoint in &entry.endpoints {
                if let Some(path) = endpoint.address.strip_prefix(UNIX_ADDRESS_PREFIX) {
                    unix_endpoint = true;
                    errors.check(validate_unix_address(path));
                    if !endpoint.ports.is_empty() {
                        errors.push(Violation::mode_dependent(format!(
                            "unix endpoint {} must not include ports",
                            endpoint.address
                        )));
                    }
                } else {
                    errors.check(validate_ipv4_address(&endpoint.address));
                    errors.check(check_endpoint_ports_declared(endpoint, &port_names));
                }
                errors.check(validate_labels(&endpoint.labels));
            }
            if unix_endpoint && entry.ports.len() != 1 {
                errors.push(Violation::mode_dependent(
                    "exactly 1 service port required for unix endpoints",
                ));
            }
        }
        Resolution::Dns => {
            if entry.endpoints.is_empty() {
                for host in &entry.hosts {
                    if validate_fqdn(host).is_err() {
                        errors.push(Violation::mode_dependent(
                            "hosts must be FQDN if no endpoints are provided for discovery mode DNS",
                        ));
                    }
                }
            }

            for endpoint in &entry.endpoints {
                errors.check(validate_fqdn(&endpoint.address));
                errors.check(validate_labels(&endpoint.labels));
                for (name, number) in &endpoint.ports {
                    if !port_names.contains(name.as_str()) {
                        errors.push(Violation::cross_field(format!(
                            "endpoint port {} is not defined by the service entry",
                            number
                        )));
                    }
                    errors.check(validate_port_name(name));
                    errors.check(validate_port(i64::from(*number)));
                }
            }
        }
        Resolution::Unrecognized(resolution) => {
            errors.push(Violation::format(format!(
                "unsupported resolution type {}",
                resolution
            )));
        }
    }

    for port in &entry.ports {
        errors.check(validate_port_name(&port.name));
        errors.check(validate_protocol(&port.protocol));
        errors.check(validate_port(i64::from(port.number)));
    }

    errors.finish()
}

fn check_endpoint_ports_declared(endpoint: &Endpoint, declared: &HashSet<&str>) -> Outcome {
    let mut errors = ErrorCollector::new();
    for (name, number) in &endpoint.ports {
        if !declared.contains(name.as_str()) {
            errors.push(Violation::cross_field(format!(
                "endpoint port {} is not defined by the service entry",
                number
            )));
        }
    }
    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::networking::Port;

    fn entry(resolution: Resolution, ports: Vec<Port>, endpoints: Vec<Endpoint>) -> ServiceEntry {
        ServiceEntry {
            hosts: vec!["api.example.com".into()],
            ports,
            resolution,
            endpoints,
            ..Default::default()
        }
    }

    fn http_port() -> Port {
        Port::new(80, "http", "http-port")
    }

    #[test]
    fn unix_endpoint_requires_exactly_one_port() {
        let entry = entry(
            Resolution::Static,
            vec![http_port(), Port::new(8080, "http", "http-alt")],
            vec![Endpoint::new("unix:///var/run/sock")],
        );
        assert_eq!(
            validate_service_entry(&entry).unwrap_err().messages(),
            vec!["exactly 1 service port required for unix endpoints"]
        );
    }

    #[test]
    fn static_endpoints() {
        let mut endpoint = Endpoint::new("10.1.1.1");
        endpoint.ports.insert("http-port".into(), 8080);
        assert!(validate_service_entry(&entry(Resolution::Static, vec![http_port()], vec![endpoint])).is_ok());

        let mut unknown = Endpoint::new("10.1.1.2");
        unknown.ports.insert("grpc".into(), 9090);
        let mut unix = Endpoint::new("unix://var/run/sock");
        unix.ports.insert("http-port".into(), 80);
        let errors = validate_service_entry(&entry(Resolution::Static, vec![http_port()], vec![unknown, unix]))
            .unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "endpoint port 9090 is not defined by the service entry",
                "var/run/sock is not an absolute path",
                "unix endpoint unix://var/run/sock must not include ports",
            ]
        );

        assert_eq!(
            validate_service_entry(&entry(Resolution::Static, vec![http_port()], vec![])).unwrap_err().messages(),
            vec!["endpoints must be provided if service entry discovery mode is static"]
        );
    }

    #[test]
    fn none_resolution_forbids_endpoints() {
        let errors = validate_service_entry(&entry(
            Resolution::None,
            vec![http_port()],
            vec![Endpoint::new("10.1.1.1")],
        ))
        .unwrap_err();
        assert_eq!(errors.messages(), vec!["no endpoints should be provided for discovery type none"]);
    }

    #[test]
    fn dns_resolution() {
        let mut wildcard = entry(Resolution::Dns, vec![http_port()], vec![]);
        wildcard.hosts = vec!["*.example.com".into()];
        assert_eq!(
            validate_service_entry(&wildcard).unwrap_err().messages(),
            vec!["hosts must be FQDN if no endpoints are provided for discovery mode DNS"]
        );

        let mut endpoint = Endpoint::new("backend.example.com");
        endpoint.ports.insert("http-port".into(), 8080);
        assert!(validate_service_entry(&entry(Resolution::Dns, vec![http_port()], vec![endpoint])).is_ok());

        let mut bad = Endpoint::new("backend.example.com");
        bad.ports.insert("Bad_Name".into(), 0);
        let errors = validate_service_entry(&entry(Resolution::Dns, vec![http_port()], vec![bad])).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "endpoint port 0 is not defined by the service entry",
                "invalid port name: Bad_Name",
                "port number 0 must be in the range 1..65535",
            ]
        );
    }

    #[test]
    fn hosts_addresses_and_ports() {
        let entry = ServiceEntry {
            hosts: vec!["*".into(), "short".into(), "*.example.com".into()],
            addresses: vec!["10.0.0.0/16".into(), "10.0.0.1".into()],
            ports: vec![http_port(), Port::new(80, "smtp", "http-port")],
            resolution: Resolution::None,
            ..Default::default()
        };
        assert_eq!(
            validate_service_entry(&entry).unwrap_err().messages(),
            vec![
                "invalid host *",
                "invalid host short",
                "10.0.0.1 is not a valid CIDR block",
                "service entry port name \"http-port\" already defined",
                "service entry port 80 already defined",
                "unsupported protocol: smtp",
            ]
        );
    }

    #[test]
    fn unknown_resolution_is_reported() {
        let entry = entry(Resolution::from("LOGICAL_DNS"), vec![http_port()], vec![]);
        assert_eq!(
            validate_service_entry(&entry).unwrap_err().messages(),
            vec!["unsupported resolution type LOGICAL_DNS"]
        );
    }
}
