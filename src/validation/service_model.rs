//! Checks on the service registry model: services, instances and endpoint
//! addresses.

use std::net::IpAddr;

use crate::domain::service::{AddressFamily, NetworkEndpoint, Service, ServiceInstance};
use crate::validation::primitives::{
    is_dns1123_label, validate_labels, validate_port, validate_unix_address,
};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

impl Service {
    /// Hostname parts are DNS-1123 labels and at least one port is declared.
    /// A port may go unnamed only when it is the sole port.
    pub fn validate(&self) -> Outcome {
        let mut errors = ErrorCollector::new();

        if self.hostname.is_empty() {
            errors.push(Violation::required("invalid empty hostname"));
        }
        for part in self.hostname.as_str().split('.') {
            if !is_dns1123_label(part) {
                errors.push(Violation::format(format!("invalid hostname part: {:?}", part)));
            }
        }

        if self.ports.is_empty() {
            errors.push(Violation::required("service must have at least one declared port"));
        }
        for port in &self.ports {
            if port.name.is_empty() {
                if self.ports.len() > 1 {
                    errors.push(Violation::cross_field(
                        "empty port names are not allowed for services with multiple ports",
                    ));
                }
            } else if !is_dns1123_label(&port.name) {
                errors.push(Violation::format(format!("invalid name: {:?}", port.name)));
            }
            if let Err(violations) = validate_port(i64::from(port.port)) {
                for violation in violations {
                    errors.push(Violation::range(format!(
                        "invalid service port value {} for {:?}: {}",
                        port.port, port.name, violation
                    )));
                }
            }
        }

        errors.finish()
    }
}

impl ServiceInstance {
    /// The instance's service is valid and its endpoint points at a port the
    /// service declares, with the same number and protocol.
    pub fn validate(&self) -> Outcome {
        let mut errors = ErrorCollector::new();

        match &self.service {
            Some(service) => errors.check(service.validate()),
            None => errors.push(Violation::required("missing service in the instance")),
        }
        errors.check(validate_labels(&self.labels));
        errors.check(validate_port(i64::from(self.endpoint.port)));

        match (&self.endpoint.service_port, &self.service) {
            (None, _) => errors.push(Violation::required("missing service port")),
            (Some(_), None) => {}
            (Some(port), Some(service)) => match service.port(&port.name) {
                None => errors.push(Violation::cross_field(format!(
                    "missing service port {:?}",
                    port.name
                ))),
                Some(expected) => {
                    if expected.port != port.port {
                        errors.push(Violation::cross_field(format!(
                            "unexpected service port value {}, expected {}",
                            port.port, expected.port
                        )));
                    }
                    if expected.protocol != port.protocol {
                        errors.push(Violation::cross_field(format!(
                            "unexpected service protocol {}, expected {}",
                            port.protocol, expected.protocol
                        )));
                    }
                }
            },
        }

        errors.finish()
    }
}

/// A TCP endpoint needs an IP address, a Unix endpoint an absolute socket path.
pub fn validate_network_endpoint_address(endpoint: &NetworkEndpoint) -> Outcome {
    match endpoint.family {
        AddressFamily::Tcp => match endpoint.address.parse::<IpAddr>() {
            Ok(_) => Ok(()),
            Err(_) => {
                Violation::format(format!("invalid IP address {}", endpoint.address)).fail()
            }
        },
        AddressFamily::Unix => validate_unix_address(&endpoint.address),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::service::ServicePort;
    use crate::domain::{Hostname, Labels, Protocol};

    fn service() -> Service {
        Service {
            hostname: Hostname::from("reviews.default.svc.cluster.local"),
            address: "10.0.0.1".into(),
            ports: vec![
                ServicePort::new("http", 9080, Protocol::Http),
                ServicePort::new("grpc", 9090, Protocol::Grpc),
            ],
        }
    }

    fn instance(port: Option<ServicePort>) -> ServiceInstance {
        ServiceInstance {
            service: Some(service()),
            endpoint: NetworkEndpoint {
                family: AddressFamily::Tcp,
                address: "172.16.0.4".into(),
                port: 9080,
                service_port: port,
            },
            labels: Labels::from([("version".to_string(), "v1".to_string())]),
        }
    }

    #[test]
    fn services() {
        assert!(service().validate().is_ok());

        let single = Service { ports: vec![ServicePort::new("", 80, Protocol::Http)], ..service() };
        assert!(single.validate().is_ok());

        let bad = Service {
            hostname: Hostname::from("reviews..local"),
            ports: vec![ServicePort::new("", 0, Protocol::Http), ServicePort::new("Bad_Name", 80, Protocol::Tcp)],
            ..service()
        };
        assert_eq!(
            bad.validate().unwrap_err().messages(),
            vec![
                "invalid hostname part: \"\"",
                "empty port names are not allowed for services with multiple ports",
                "invalid service port value 0 for \"\": port number 0 must be in the range 1..65535",
                "invalid name: \"Bad_Name\"",
            ]
        );

        let empty = Service::default().validate().unwrap_err();
        assert!(empty.contains("invalid empty hostname"));
        assert!(empty.contains("service must have at least one declared port"));
    }

    #[test]
    fn service_instances() {
        assert!(instance(Some(ServicePort::new("http", 9080, Protocol::Http))).validate().is_ok());

        assert_eq!(
            instance(None).validate().unwrap_err().messages(),
            vec!["missing service port"]
        );
        assert_eq!(
            instance(Some(ServicePort::new("tcp", 9080, Protocol::Tcp))).validate().unwrap_err().messages(),
            vec!["missing service port \"tcp\""]
        );
        assert_eq!(
            instance(Some(ServicePort::new("grpc", 9091, Protocol::Http2))).validate().unwrap_err().messages(),
            vec![
                "unexpected service port value 9091, expected 9090",
                "unexpected service protocol HTTP2, expected GRPC",
            ]
        );

        let orphan = ServiceInstance { service: None, ..instance(Some(ServicePort::new("http", 9080, Protocol::Http))) };
        assert_eq!(orphan.validate().unwrap_err().messages(), vec!["missing service in the instance"]);
    }

    #[test]
    fn endpoint_addresses() {
        let tcp = NetworkEndpoint { address: "::1".into(), ..Default::default() };
        assert!(validate_network_endpoint_address(&tcp).is_ok());

        let bad = NetworkEndpoint { address: "not-an-ip".into(), ..Default::default() };
        assert_eq!(
            validate_network_endpoint_address(&bad).unwrap_err().messages(),
            vec!["invalid IP address not-an-ip"]
        );

        let unix = NetworkEndpoint { family: AddressFamily::Unix, address: "/var/run/app.sock".into(), ..Default::default() };
        assert!(validate_network_endpoint_address(&unix).is_ok());
    }
}
