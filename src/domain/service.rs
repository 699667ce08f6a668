//! The service registry model: services, their ports and the instances
//! backing them.

use serde::Deserialize;

use super::{Hostname, Labels, Protocol};

/// A service known to the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Service {
    pub hostname: Hostname,
    pub address: String,
    pub ports: Vec<ServicePort>,
}

impl Service {
    /// Look up a declared port by name.
    pub fn port(&self, name: &str) -> Option<&ServicePort> {
        self.ports.iter().find(|port| port.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServicePort {
    #[serde(default)]
    pub name: String,
    pub port: i32,
    pub protocol: Protocol,
}

impl ServicePort {
    pub fn new(name: impl Into<String>, port: i32, protocol: Protocol) -> Self {
        Self { name: name.into(), port, protocol }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    #[default]
    Tcp,
    Unix,
}

/// A network address a service instance listens on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkEndpoint {
    pub family: AddressFamily,
    pub address: String,
    pub port: i32,
    pub service_port: Option<ServicePort>,
}

/// One workload backing a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceInstance {
    pub service: Option<Service>,
    pub endpoint: NetworkEndpoint,
    pub labels: Labels,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_ports_by_name() {
        let service = Service {
            hostname: Hostname::from("reviews.default.svc.cluster.local"),
            address: "10.0.0.1".into(),
            ports: vec![
                ServicePort::new("http", 9080, Protocol::Http),
                ServicePort::new("grpc", 9090, Protocol::Grpc),
            ],
        };
        assert_eq!(service.port("grpc").map(|p| p.port), Some(9090));
        assert!(service.port("tcp").is_none());
    }

    #[test]
    fn endpoint_reads_family() {
        let endpoint: NetworkEndpoint =
            serde_json::from_str(r#"{"family": "unix", "address": "/var/run/app.sock"}"#).unwrap();
        assert_eq!(endpoint.family, AddressFamily::Unix);
        assert_eq!(endpoint.port, 0);
    }
}
