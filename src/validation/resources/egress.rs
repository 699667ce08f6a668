use crate::domain::protocol::{
    protocol_list, EGRESS_SUPPORTED_PROTOCOLS, EGRESS_SUPPORTED_TCP_PROTOCOLS,
};
use crate::domain::routing::{EgressPort, EgressRule};
use crate::domain::Protocol;
use crate::validation::primitives::{validate_egress_domain, validate_ipv4_subnet, validate_port};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

fn is_cidr_service(service: &str) -> bool {
    service.matches('/').count() == 1
}

/// An egress destination is a CIDR block or an egress domain.
pub fn validate_egress_rule_service(service: &str) -> Outcome {
    if is_cidr_service(service) {
        validate_ipv4_subnet(service)
    } else {
        validate_egress_domain(service)
    }
}

pub fn validate_egress_rule_port(port: &EgressPort) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check(validate_port(i64::from(port.port)));
    if !Protocol::parse(&port.protocol).is_egress_supported() {
        errors.push(Violation::unsupported(format!(
            "egress rule support is available only for the following protocols: {}",
            protocol_list(&EGRESS_SUPPORTED_PROTOCOLS)
        )));
    }
    errors.finish()
}

/// Validate a legacy egress rule.
pub fn validate_egress_rule(rule: &EgressRule) -> Outcome {
    let mut errors = ErrorCollector::new();

    match &rule.destination {
        None => errors.push(Violation::required("destination of egress rule must be provided")),
        Some(destination) => {
            if !destination.labels.is_empty() {
                errors.push(Violation::cross_field(
                    "destination of egress rule must not have labels",
                ));
            }
            if !destination.name.is_empty() {
                errors.push(Violation::cross_field("destination of egress rule must not have name"));
            }
            if !destination.namespace.is_empty() {
                errors.push(Violation::cross_field(
                    "destination of egress rule must not have namespace",
                ));
            }
            if !destination.domain.is_empty() {
                errors.push(Violation::cross_field(
                    "destination of egress rule must not have domain",
                ));
            }
            errors.check(validate_egress_rule_service(&destination.service));
        }
    }

    if rule.ports.is_empty() {
        errors.push(Violation::required("egress rule must have a ports list"));
    }

    let cidr_service = rule
        .destination
        .as_ref()
        .map(|destination| destination.service.as_str())
        .filter(|service| is_cidr_service(service));
    let mut seen = std::collections::HashSet::new();
    for port in &rule.ports {
        if !seen.insert(port.port) {
            errors.push(Violation::uniqueness(format!("duplicate port: {}", port.port)));
        }
        errors.check(validate_egress_rule_port(port));

        let Some(service) = cidr_service else {
            continue;
        };
        if !Protocol::parse(&port.protocol).is_egress_supported_tcp() {
            errors.push(Violation::mode_dependent(format!(
                "Only the following protocols can be defined for CIDR destination service notation: {}. \
                 This rule - port: {} protocol: {} destination.service: {}",
                protocol_list(&EGRESS_SUPPORTED_TCP_PROTOCOLS),
                port.port,
                port.protocol,
                service
            )));
        }
    }

    if rule.use_egress_proxy {
        errors.push(Violation::unsupported(
            "directing traffic through egress proxy is not implemented yet",
        ));
    }

    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::routing::IstioService;
    use crate::validation::report::ViolationKind;

    fn rule(service: &str, ports: Vec<EgressPort>) -> EgressRule {
        EgressRule {
            destination: Some(IstioService::service(service)),
            ports,
            use_egress_proxy: false,
        }
    }

    #[test]
    fn domain_destinations() {
        assert!(validate_egress_rule(&rule("*cnn.com", vec![EgressPort::new(80, "http")])).is_ok());
        assert!(validate_egress_rule(&rule("*.cnn.com", vec![EgressPort::new(443, "https")])).is_ok());
        assert!(validate_egress_rule(&rule("", vec![EgressPort::new(80, "http")])).is_err());
    }

    #[test]
    fn cidr_destinations_only_allow_tcp_protocols() {
        assert!(validate_egress_rule(&rule("192.168.3.0/24", vec![EgressPort::new(80, "tcp")])).is_ok());

        let errors =
            validate_egress_rule(&rule("192.168.3.0/24", vec![EgressPort::new(80, "http")])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.as_slice()[0].kind, ViolationKind::ModeDependent);
        assert!(errors.contains("TCP,Mongo"));
        assert!(errors.contains("destination.service: 192.168.3.0/24"));
    }

    #[test]
    fn ports_are_required_unique_and_supported() {
        assert_eq!(
            validate_egress_rule(&rule("cnn.com", vec![])).unwrap_err().messages(),
            vec!["egress rule must have a ports list"]
        );

        let errors = validate_egress_rule(&rule(
            "cnn.com",
            vec![EgressPort::new(80, "http"), EgressPort::new(80, "http"), EgressPort::new(0, "udp")],
        ))
        .unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "duplicate port: 80",
                "port number 0 must be in the range 1..65535",
                "egress rule support is available only for the following protocols: HTTP,HTTP2,GRPC,HTTPS,TCP,Mongo",
            ]
        );
    }

    #[test]
    fn destination_must_only_set_service() {
        assert_eq!(
            validate_egress_rule(&EgressRule::default()).unwrap_err().messages(),
            vec!["destination of egress rule must be provided", "egress rule must have a ports list"]
        );

        let mut destination = IstioService::named("reviews");
        destination.service = "cnn.com".into();
        destination.namespace = "default".into();
        let rule = EgressRule {
            destination: Some(destination),
            ports: vec![EgressPort::new(80, "http")],
            use_egress_proxy: true,
        };
        assert_eq!(
            validate_egress_rule(&rule).unwrap_err().messages(),
            vec![
                "destination of egress rule must not have name",
                "destination of egress rule must not have namespace",
                "directing traffic through egress proxy is not implemented yet",
            ]
        );
    }

    #[test]
    fn missing_destination_still_checks_ports_and_proxy() {
        let rule = EgressRule {
            destination: None,
            ports: vec![EgressPort::new(80, "http"), EgressPort::new(80, "smtp")],
            use_egress_proxy: true,
        };
        let errors = validate_egress_rule(&rule).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "destination of egress rule must be provided",
                "duplicate port: 80",
                "egress rule support is available only for the following protocols: HTTP,HTTP2,GRPC,HTTPS,TCP,Mongo",
                "directing traffic through egress proxy is not implemented yet",
            ]
        );
        assert_eq!(errors.as_slice()[0].kind, ViolationKind::Required);
    }
}
