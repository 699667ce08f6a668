use crate::domain::routing::{CircuitBreaker, DestinationPolicy, LbPolicy, LoadBalancing};
use crate::validation::primitives::{validate_percent, validate_required_duration};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

use super::route_rule::validate_istio_service;

pub fn validate_load_balancing(load_balancing: &LoadBalancing) -> Outcome {
    match &load_balancing.lb_policy {
        Some(LbPolicy::Name(name)) if !name.is_recognized() => {
            Violation::format(format!("unrecognized load balancing policy {:?}", name.as_str()))
                .fail()
        }
        Some(_) => Ok(()),
        None => Violation::required("load balancing must set a policy").fail(),
    }
}

pub fn validate_circuit_breaker(circuit_breaker: &CircuitBreaker) -> Outcome {
    let Some(cb) = &circuit_breaker.simple_cb else {
        return Ok(());
    };

    let mut errors = ErrorCollector::new();
    let mut non_negative = |value: i32, field: &str| {
        if value < 0 {
            errors.push(Violation::range(format!(
                "circuitBreaker {} must be in range [0..]",
                field
            )));
        }
    };
    non_negative(cb.max_connections, "maxConnections");
    non_negative(cb.http_max_pending_requests, "maxPendingRequests");
    non_negative(cb.http_max_requests, "maxRequests");
    non_negative(cb.http_max_requests_per_connection, "maxRequestsPerConnection");
    non_negative(cb.http_consecutive_errors, "httpConsecutiveErrors");

    // both durations are mandatory once a simple breaker is configured
    errors.check_with_prefix(
        "circuitBreaker httpDetectionInterval:",
        validate_required_duration(cb.http_detection_interval.as_ref()),
    );
    errors.check_with_prefix(
        "circuitBreaker sleepWindow:",
        validate_required_duration(cb.sleep_window.as_ref()),
    );
    errors.check_with_prefix(
        "circuitBreaker httpMaxEjectionPercent:",
        validate_percent(cb.http_max_ejection_percent),
    );

    errors.finish()
}

/// Validate a legacy destination policy.
pub fn validate_destination_policy(policy: &DestinationPolicy) -> Outcome {
    let mut errors = ErrorCollector::new();

    match &policy.destination {
        Some(destination) => errors.check(validate_istio_service(destination)),
        None => errors.push(Violation::required("destination is required")),
    }
    if let Some(source) = &policy.source {
        errors.check(validate_istio_service(source));
    }
    if let Some(load_balancing) = &policy.load_balancing {
        errors.check(validate_load_balancing(load_balancing));
    }
    if let Some(circuit_breaker) = &policy.circuit_breaker {
        errors.check(validate_circuit_breaker(circuit_breaker));
    }

    errors.finish()
}
