use crate::domain::networking::{
    ConnectionPoolSettings, DestinationRule, LoadBalancerPolicy, LoadBalancerSettings,
    OutlierDetection, Subset, TlsMode, TlsSettings, TrafficPolicy,
};
use crate::validation::primitives::{
    validate_duration, validate_host_or_subnet, validate_http_header_name, validate_labels,
    validate_percent, validate_subset_name,
};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

/// Validate a destination rule: host, traffic policy and subsets.
pub fn validate_destination_rule(rule: &DestinationRule) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check(validate_host_or_subnet(&rule.host));
    if let Some(policy) = &rule.traffic_policy {
        errors.check(validate_traffic_policy(policy));
    }
    for subset in &rule.subsets {
        errors.check(validate_subset(subset));
    }
    errors.finish()
}

pub fn validate_traffic_policy(policy: &TrafficPolicy) -> Outcome {
    if policy.is_empty() {
        return Violation::required("traffic policy must have at least one field").fail();
    }

    let mut errors = ErrorCollector::new();
    if let Some(outlier) = &policy.outlier_detection {
        errors.check(validate_outlier_detection(outlier));
    }
    if let Some(pool) = &policy.connection_pool {
        errors.check(validate_connection_pool(pool));
    }
    if let Some(load_balancer) = &policy.load_balancer {
        errors.check(validate_load_balancer(load_balancer));
    }
    if let Some(tls) = &policy.tls {
        errors.check(validate_tls(tls));
    }
    errors.finish()
}

pub fn validate_outlier_detection(outlier: &OutlierDetection) -> Outcome {
    let mut errors = ErrorCollector::new();
    if let Some(base_ejection_time) = &outlier.base_ejection_time {
        errors.check(validate_duration(base_ejection_time));
    }
    if outlier.consecutive_errors < 0 {
        errors.push(Violation::range(
            "outlier detection consecutive errors cannot be negative",
        ));
    }
    if let Some(interval) = &outlier.interval {
        errors.check(validate_duration(interval));
    }
    errors.check(validate_percent(outlier.max_ejection_percent));
    errors.finish()
}

pub fn validate_connection_pool(settings: &ConnectionPoolSettings) -> Outcome {
    if settings.http.is_none() && settings.tcp.is_none() {
        return Violation::required("connection pool must have at least one field").fail();
    }

    let mut errors = ErrorCollector::new();
    if let Some(http) = &settings.http {
        let counters = [
            (http.http1_max_pending_requests, "http1 max pending requests"),
            (http.http2_max_requests, "http2 max requests"),
            (http.max_requests_per_connection, "max requests per connection"),
            (http.max_retries, "max retries"),
        ];
        for (value, field) in counters {
            if value < 0 {
                errors.push(Violation::range(format!("{} must be non-negative", field)));
            }
        }
    }
    if let Some(tcp) = &settings.tcp {
        if tcp.max_connections < 0 {
            errors.push(Violation::range("max connections must be non-negative"));
        }
        if let Some(timeout) = &tcp.connect_timeout {
            errors.check(validate_duration(timeout));
        }
    }
    errors.finish()
}

/// Simple policies are always valid; consistent hashing keys on a header.
pub fn validate_load_balancer(settings: &LoadBalancerSettings) -> Outcome {
    match &settings.lb_policy {
        Some(LoadBalancerPolicy::Simple(simple)) if !simple.is_recognized() => {
            Violation::format(format!("unrecognized load balancer {:?}", simple.as_str())).fail()
        }
        Some(LoadBalancerPolicy::Simple(_)) => Ok(()),
        Some(LoadBalancerPolicy::ConsistentHash(hash)) => {
            let mut errors = ErrorCollector::new();
            errors.check_with_prefix(
                "consistent hash:",
                validate_http_header_name(&hash.http_header),
            );
            errors.finish()
        }
        None => Violation::required("load balancer must set simple or consistentHash").fail(),
    }
}

pub fn validate_tls(settings: &TlsSettings) -> Outcome {
    let mut errors = ErrorCollector::new();
    match &settings.mode {
        TlsMode::Mutual => {
            if settings.client_certificate.is_empty() {
                errors.push(Violation::mode_dependent(
                    "client certificate required for mutual tls",
                ));
            }
            if settings.private_key.is_empty() {
                errors.push(Violation::mode_dependent("private key required for mutual tls"));
            }
        }
        TlsMode::Unrecognized(mode) => {
            errors.push(Violation::format(format!("unrecognized TLS mode {:?}", mode)));
        }
        TlsMode::Disable | TlsMode::Simple => {}
    }
    errors.finish()
}

pub fn validate_subset(subset: &Subset) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check(validate_subset_name(&subset.name));
    errors.check(validate_labels(&subset.labels));
    if let Some(policy) = &subset.traffic_policy {
        errors.check(validate_traffic_policy(policy));
    }
    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::networking::{ConsistentHashLb, HttpSettings, SimpleLb, TcpSettings};
    use crate::domain::wire::{millis, seconds};
    use crate::domain::Labels;

    fn rule() -> DestinationRule {
        DestinationRule { host: "reviews".into(), ..Default::default() }
    }

    #[test]
    fn host_and_subsets() {
        let mut valid = rule();
        valid.subsets.push(Subset {
            name: "v1".into(),
            labels: Labels::from([("version".to_string(), "v1".to_string())]),
            traffic_policy: None,
        });
        assert!(validate_destination_rule(&valid).is_ok());

        let invalid = DestinationRule {
            host: "foo_bar".into(),
            subsets: vec![Subset::default()],
            ..Default::default()
        };
        let errors = validate_destination_rule(&invalid).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains("subset name cannot be empty"));
    }

    #[test]
    fn empty_traffic_policy_is_rejected() {
        let policy = TrafficPolicy::default();
        assert_eq!(
            validate_traffic_policy(&policy).unwrap_err().messages(),
            vec!["traffic policy must have at least one field"]
        );

        let subset = Subset { name: "v2".into(), traffic_policy: Some(policy), ..Default::default() };
        assert!(validate_subset(&subset).is_err());
    }

    #[test]
    fn outlier_detection() {
        let valid = OutlierDetection {
            consecutive_errors: 5,
            interval: Some(seconds(10)),
            base_ejection_time: Some(seconds(30)),
            max_ejection_percent: 10,
        };
        assert!(validate_outlier_detection(&valid).is_ok());

        let invalid = OutlierDetection {
            consecutive_errors: -1,
            interval: Some(millis(0)),
            base_ejection_time: None,
            max_ejection_percent: 120,
        };
        assert_eq!(validate_outlier_detection(&invalid).unwrap_err().len(), 3);
    }

    #[test]
    fn connection_pool() {
        assert_eq!(
            validate_connection_pool(&ConnectionPoolSettings::default()).unwrap_err().messages(),
            vec!["connection pool must have at least one field"]
        );

        let settings = ConnectionPoolSettings {
            tcp: Some(TcpSettings { max_connections: -1, connect_timeout: Some(millis(5)) }),
            http: Some(HttpSettings { http2_max_requests: -1, max_retries: -3, ..Default::default() }),
        };
        assert_eq!(
            validate_connection_pool(&settings).unwrap_err().messages(),
            vec![
                "http2 max requests must be non-negative",
                "max retries must be non-negative",
                "max connections must be non-negative",
            ]
        );
    }

    #[test]
    fn load_balancer_variants() {
        let simple = LoadBalancerSettings { lb_policy: Some(LoadBalancerPolicy::Simple(SimpleLb::Random)) };
        assert!(validate_load_balancer(&simple).is_ok());

        let hash = LoadBalancerSettings {
            lb_policy: Some(LoadBalancerPolicy::ConsistentHash(ConsistentHashLb {
                http_header: "x-user".into(),
                minimum_ring_size: 1024,
            })),
        };
        assert!(validate_load_balancer(&hash).is_ok());

        let empty_header = LoadBalancerSettings {
            lb_policy: Some(LoadBalancerPolicy::ConsistentHash(ConsistentHashLb::default())),
        };
        assert_eq!(
            validate_load_balancer(&empty_header).unwrap_err().messages(),
            vec!["consistent hash: header name cannot be empty"]
        );
        assert!(validate_load_balancer(&LoadBalancerSettings::default()).is_err());
    }

    #[test]
    fn mutual_tls_needs_client_material() {
        let tls = TlsSettings { mode: TlsMode::Mutual, ..Default::default() };
        assert_eq!(
            validate_tls(&tls).unwrap_err().messages(),
            vec!["client certificate required for mutual tls", "private key required for mutual tls"]
        );
        assert!(validate_tls(&TlsSettings { mode: TlsMode::Simple, ..Default::default() }).is_ok());
    }
}
