//! Legacy route rules and ingress rules, plus the service-reference and
//! fault-injection checks they share with destination policies and mixer
//! bindings.

use crate::domain::common::{AbortErrorType, DelayType, StringMatchType};
use crate::domain::routing::{
    DestinationWeight, HttpAbort, HttpDelay, HttpFaultInjection, HttpRetry, HttpTimeout,
    IngressRule, IstioService, L4FaultInjection, L4MatchAttributes, MatchCondition, RouteRule,
    Terminate, Throttle, ThrottleAfter,
};
use crate::validation::primitives::{
    is_dns1123_label, validate_duration, validate_float_percent, validate_fqdn,
    validate_http_header_name, validate_ipv4_subnet, validate_labels, validate_percent,
    validate_required_duration,
};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

use super::egress::validate_egress_rule_service;
use super::helpers::{validate_cors_policy, validate_string_match};

/// Header whose match value is the request path.
pub const HEADER_URI: &str = "uri";

/// Validate a reference to a service: by short `name`, or by `service`
/// (a domain or CIDR), never both.
pub fn validate_istio_service(svc: &IstioService) -> Outcome {
    let mut errors = ErrorCollector::new();

    if svc.name.is_empty() && svc.service.is_empty() {
        errors.push(Violation::required(
            "name or service is mandatory for a service reference",
        ));
    } else if !svc.service.is_empty() && !svc.name.is_empty() {
        errors.push(Violation::cross_field("specify either name or service, not both"));
    } else if !svc.service.is_empty() {
        errors.check(validate_egress_rule_service(&svc.service));
        if !svc.namespace.is_empty() {
            errors.push(Violation::cross_field(
                "namespace is not valid when service is provided",
            ));
        }
        if !svc.domain.is_empty() {
            errors.push(Violation::cross_field(
                "domain is not valid when service is provided",
            ));
        }
    } else if !is_dns1123_label(&svc.name) {
        errors.push(Violation::format(format!(
            "name {:?} must be a valid label",
            svc.name
        )));
    }

    if !svc.namespace.is_empty() && !is_dns1123_label(&svc.namespace) {
        errors.push(Violation::format(format!(
            "namespace {:?} must be a valid label",
            svc.namespace
        )));
    }
    if !svc.domain.is_empty() {
        errors.check(validate_fqdn(&svc.domain));
    }
    errors.check(validate_labels(&svc.labels));

    errors.finish()
}

pub fn validate_l4_match_attributes(attributes: &L4MatchAttributes) -> Outcome {
    let mut errors = ErrorCollector::new();
    for subnet in attributes.source_subnet.iter().chain(&attributes.destination_subnet) {
        errors.check(validate_ipv4_subnet(subnet));
    }
    errors.finish()
}

pub fn validate_match_condition(condition: &MatchCondition) -> Outcome {
    let mut errors = ErrorCollector::new();

    if let Some(source) = &condition.source {
        errors.check(validate_istio_service(source));
    }
    if let Some(tcp) = &condition.tcp {
        errors.check(validate_l4_match_attributes(tcp));
    }
    if let Some(udp) = &condition.udp {
        errors.check(validate_l4_match_attributes(udp));
        errors.push(Violation::unsupported("UDP protocol not supported yet"));
    }

    if let Some(request) = &condition.request {
        for (name, value) in &request.headers {
            errors.check(validate_http_header_name(name));
            errors.check_with_prefix(
                &format!("header {:?} value invalid:", name),
                validate_string_match(value),
            );

            // the path of an absolute URI is never empty
            if name == HEADER_URI {
                let empty_variant = match &value.match_type {
                    Some(StringMatchType::Exact(v)) if v.is_empty() => Some("exact"),
                    Some(StringMatchType::Prefix(v)) if v.is_empty() => Some("prefix"),
                    Some(StringMatchType::Regex(v)) if v.is_empty() => Some("regex"),
                    _ => None,
                };
                if let Some(variant) = empty_variant {
                    errors.push(Violation::required(format!(
                        "{} header value for {:?} must be non-empty",
                        variant, HEADER_URI
                    )));
                }
            }
        }
    }

    errors.finish()
}

pub fn validate_destination_weight(weight: &DestinationWeight) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check(validate_labels(&weight.labels));
    errors.check_with_prefix("weight invalid:", validate_percent(weight.weight));
    errors.finish()
}

/// Weights of a legacy route must total exactly 100. A lone destination
/// with weight 0 stands for 100.
pub fn validate_weights(routes: &[DestinationWeight]) -> Outcome {
    let sum: i64 = routes.iter().map(|route| i64::from(route.weight)).sum();
    if routes.len() == 1 && sum == 0 {
        return Ok(());
    }
    if sum != 100 {
        return Violation::range(format!("route weights total {} (must total 100)", sum)).fail();
    }
    Ok(())
}

pub fn validate_http_timeout(timeout: &HttpTimeout) -> Outcome {
    match &timeout.simple_timeout {
        Some(simple) => {
            let mut errors = ErrorCollector::new();
            errors.check_with_prefix(
                "httpTimeout invalid:",
                validate_required_duration(simple.timeout.as_ref()),
            );
            errors.finish()
        }
        None => Ok(()),
    }
}

pub fn validate_http_retries(retry: &HttpRetry) -> Outcome {
    let Some(simple) = &retry.simple_retry else {
        return Ok(());
    };
    let mut errors = ErrorCollector::new();
    if simple.attempts < 0 {
        errors.push(Violation::range("attempts must be in range [0..]"));
    }
    errors.check_with_prefix(
        "perTryTimeout invalid:",
        validate_required_duration(simple.per_try_timeout.as_ref()),
    );
    errors.finish()
}

pub fn validate_delay(delay: &HttpDelay) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check_with_prefix("percent invalid:", validate_float_percent(delay.percent));

    match &delay.delay_type {
        Some(DelayType::FixedDelay(fixed)) => {
            errors.check_with_prefix("fixedDelay invalid:", validate_duration(fixed));
        }
        Some(DelayType::ExponentialDelay(exponential)) => {
            errors.check_with_prefix("exponentialDelay invalid:", validate_duration(exponential));
            errors.push(Violation::unsupported("exponentialDelay not supported yet"));
        }
        None => errors.push(Violation::required(
            "delay must set fixedDelay or exponentialDelay",
        )),
    }

    errors.finish()
}

pub fn validate_abort(abort: &HttpAbort) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check_with_prefix("percent invalid:", validate_float_percent(abort.percent));

    match &abort.error_type {
        Some(AbortErrorType::GrpcStatus(_)) => {
            errors.push(Violation::unsupported("gRPC fault injection not supported yet"));
        }
        Some(AbortErrorType::Http2Error(_)) => {
            errors.push(Violation::unsupported(
                "HTTP/2 abort fault injection not supported yet",
            ));
        }
        Some(AbortErrorType::HttpStatus(status)) => {
            if !(0..=600).contains(status) {
                errors.push(Violation::range(format!("invalid abort http status {}", status)));
            }
        }
        None => errors.push(Violation::required("abort must set an error type")),
    }

    errors.finish()
}

pub fn validate_http_fault(fault: &HttpFaultInjection) -> Outcome {
    let mut errors = ErrorCollector::new();
    if let Some(delay) = &fault.delay {
        errors.check(validate_delay(delay));
    }
    if let Some(abort) = &fault.abort {
        errors.check(validate_abort(abort));
    }
    errors.finish()
}

pub fn validate_terminate(terminate: &Terminate) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check_with_prefix(
        "terminate percent invalid:",
        validate_float_percent(terminate.percent),
    );
    errors.finish()
}

pub fn validate_throttle(throttle: &Throttle) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check_with_prefix(
        "throttle percent invalid:",
        validate_float_percent(throttle.percent),
    );
    if throttle.downstream_limit_bps < 0 {
        errors.push(Violation::range("downstreamLimitBps invalid"));
    }
    if throttle.upstream_limit_bps < 0 {
        errors.push(Violation::range("upstreamLimitBps invalid"));
    }

    match &throttle.throttle_after {
        Some(ThrottleAfter::ThrottleAfterPeriod(period)) => {
            if validate_duration(period).is_err() {
                errors.push(Violation::format("throttleAfterPeriod invalid"));
            }
        }
        Some(ThrottleAfter::ThrottleAfterBytes(bytes)) => {
            if bytes.is_nan() || *bytes < 0.0 {
                errors.push(Violation::range("throttleAfterBytes invalid"));
            }
        }
        None => errors.push(Violation::required(
            "throttle must set throttleAfterPeriod or throttleAfterBytes",
        )),
    }

    errors.finish()
}

pub fn validate_l4_fault(fault: &L4FaultInjection) -> Outcome {
    let mut errors = ErrorCollector::new();
    if let Some(terminate) = &fault.terminate {
        errors.check(validate_terminate(terminate));
        errors.push(Violation::unsupported("the terminate fault not supported yet"));
    }
    if let Some(throttle) = &fault.throttle {
        errors.check(validate_throttle(throttle));
    }
    errors.finish()
}

/// Validate a legacy route rule.
pub fn validate_route_rule(rule: &RouteRule) -> Outcome {
    let mut errors = ErrorCollector::new();

    match &rule.destination {
        None => errors.push(Violation::required(
            "route rule must have a destination service",
        )),
        Some(destination) => {
            errors.check(validate_istio_service(destination));
            if !destination.labels.is_empty() {
                errors.push(Violation::cross_field(
                    "route rule destination labels must be empty",
                ));
            }
        }
    }

    if let Some(condition) = &rule.match_ {
        errors.check(validate_match_condition(condition));
    }

    if let Some(rewrite) = &rule.rewrite {
        if rewrite.uri.is_empty() && rewrite.authority.is_empty() {
            errors.push(Violation::required("rewrite must specify path, host, or both"));
        }
    }

    if let Some(redirect) = &rule.redirect {
        if !rule.route.is_empty() {
            errors.push(Violation::cross_field("rule cannot contain both route and redirect"));
        }
        if rule.http_fault.is_some() {
            errors.push(Violation::cross_field("rule cannot contain both fault and redirect"));
        }
        if redirect.authority.is_empty() && redirect.uri.is_empty() {
            errors.push(Violation::required("redirect must specify path, host, or both"));
        }
        if rule.websocket_upgrade {
            errors.push(Violation::cross_field(
                "WebSocket upgrade is not allowed on redirect rules",
            ));
        }
        if rule.rewrite.is_some() {
            errors.push(Violation::cross_field(
                "rule cannot contain both rewrite and redirect",
            ));
        }
    }

    if !rule.route.is_empty() {
        for weight in &rule.route {
            errors.check(validate_destination_weight(weight));
        }
        errors.check(validate_weights(&rule.route));
    }

    if let Some(mirror) = &rule.mirror {
        errors.check(validate_istio_service(mirror));
    }

    for (name, value) in &rule.append_headers {
        errors.check(validate_http_header_name(name));
        if value.is_empty() {
            errors.push(Violation::required(format!(
                "appended header {:?} must have a non-empty value",
                name
            )));
        }
    }

    if let Some(cors) = &rule.cors_policy {
        errors.check(validate_cors_policy(cors));
    }
    if let Some(timeout) = &rule.http_req_timeout {
        errors.check(validate_http_timeout(timeout));
    }
    if let Some(retries) = &rule.http_req_retries {
        errors.check(validate_http_retries(retries));
    }
    if let Some(fault) = &rule.http_fault {
        errors.check(validate_http_fault(fault));
    }
    if let Some(fault) = &rule.l4_fault {
        errors.check(validate_l4_fault(fault));
        errors.push(Violation::unsupported("L4 faults are not implemented"));
    }

    errors.finish()
}

/// Validate a legacy ingress rule.
pub fn validate_ingress_rule(rule: &IngressRule) -> Outcome {
    let mut errors = ErrorCollector::new();
    match &rule.destination {
        None => errors.push(Violation::required(
            "ingress rule must have a destination service",
        )),
        Some(destination) => {
            errors.check(validate_istio_service(destination));
            if !destination.labels.is_empty() {
                errors.push(Violation::cross_field(
                    "ingress rule destination labels must be empty",
                ));
            }
        }
    }
    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::common::{HttpRedirect, HttpRewrite, StringMatch};
    use crate::domain::routing::{MatchRequest, SimpleRetryPolicy, SimpleTimeoutPolicy};
    use crate::domain::wire::{millis, seconds};
    use crate::domain::Labels;
    use crate::validation::report::ViolationKind;

    fn weight(weight: i32) -> DestinationWeight {
        DestinationWeight { labels: Labels::new(), weight }
    }

    fn valid_rule() -> RouteRule {
        RouteRule {
            destination: Some(IstioService::named("reviews")),
            ..Default::default()
        }
    }

    #[test]
    fn service_references() {
        assert!(validate_istio_service(&IstioService::named("reviews")).is_ok());
        assert!(validate_istio_service(&IstioService::service("*.cnn.com")).is_ok());
        assert!(validate_istio_service(&IstioService::service("10.0.0.0/8")).is_ok());

        let neither = validate_istio_service(&IstioService::default()).unwrap_err();
        assert_eq!(neither.messages(), vec!["name or service is mandatory for a service reference"]);

        let both = IstioService { name: "a".into(), service: "b.com".into(), ..Default::default() };
        assert_eq!(
            validate_istio_service(&both).unwrap_err().messages(),
            vec!["specify either name or service, not both"]
        );

        let scoped = IstioService {
            service: "api.example.com".into(),
            namespace: "default".into(),
            domain: "svc.cluster.local".into(),
            ..Default::default()
        };
        assert_eq!(validate_istio_service(&scoped).unwrap_err().len(), 2);

        let bad = IstioService {
            name: "Bad_Name".into(),
            namespace: "Bad_Ns".into(),
            domain: "-bad.com".into(),
            labels: Labels::from([("bad key".to_string(), "v".to_string())]),
            ..Default::default()
        };
        assert_eq!(validate_istio_service(&bad).unwrap_err().len(), 4);
    }

    #[test]
    fn legacy_weights_must_total_exactly_100() {
        assert!(validate_weights(&[weight(100)]).is_ok());
        assert!(validate_weights(&[weight(0)]).is_ok());
        assert!(validate_weights(&[weight(75), weight(25)]).is_ok());
        assert_eq!(
            validate_weights(&[weight(60), weight(30)]).unwrap_err().messages(),
            vec!["route weights total 90 (must total 100)"]
        );
        assert!(validate_weights(&[weight(0), weight(0)]).is_err());
        assert!(validate_weights(&[weight(50)]).is_err());
    }

    #[test]
    fn destination_weight_prefixes_percent_errors() {
        assert_eq!(
            validate_destination_weight(&weight(120)).unwrap_err().messages(),
            vec!["weight invalid: percentage 120 is not in range 0..100"]
        );
    }

    #[test]
    fn match_condition_checks_headers_and_udp() {
        let condition = MatchCondition {
            udp: Some(L4MatchAttributes::default()),
            tcp: Some(L4MatchAttributes {
                source_subnet: vec!["10.0.0.0/8".into(), "not-a-subnet".into()],
                ..Default::default()
            }),
            request: Some(MatchRequest {
                headers: [
                    ("uri".to_string(), StringMatch::prefix("")),
                    ("Cookie".to_string(), StringMatch::default()),
                ]
                .into_iter()
                .collect(),
            }),
            ..Default::default()
        };
        let errors = validate_match_condition(&condition).unwrap_err();
        assert!(errors.contains("not-a-subnet is not a valid IP"));
        assert!(errors.contains("UDP protocol not supported yet"));
        assert!(errors.contains("header name \"Cookie\" must be in lower case"));
        assert!(errors.contains("header \"Cookie\" value invalid: unrecognized string match"));
        assert!(errors.contains("prefix header value for \"uri\" must be non-empty"));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn redirect_conflicts_are_each_reported() {
        let rule = RouteRule {
            redirect: Some(HttpRedirect::default()),
            rewrite: Some(HttpRewrite { uri: "/v2".into(), authority: String::new() }),
            route: vec![weight(100)],
            http_fault: Some(HttpFaultInjection::default()),
            websocket_upgrade: true,
            ..valid_rule()
        };
        let errors = validate_route_rule(&rule).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "rule cannot contain both route and redirect",
                "rule cannot contain both fault and redirect",
                "redirect must specify path, host, or both",
                "WebSocket upgrade is not allowed on redirect rules",
                "rule cannot contain both rewrite and redirect",
            ]
        );
        assert_eq!(errors.as_slice()[0].kind, ViolationKind::CrossField);
    }

    #[test]
    fn route_rule_requires_label_free_destination() {
        let missing = validate_route_rule(&RouteRule::default()).unwrap_err();
        assert_eq!(missing.messages(), vec!["route rule must have a destination service"]);

        let mut destination = IstioService::named("reviews");
        destination.labels.insert("version".into(), "v1".into());
        let rule = RouteRule { destination: Some(destination), ..Default::default() };
        assert_eq!(
            validate_route_rule(&rule).unwrap_err().messages(),
            vec!["route rule destination labels must be empty"]
        );
    }

    #[test]
    fn timeouts_and_retries() {
        let rule = RouteRule {
            http_req_timeout: Some(HttpTimeout {
                simple_timeout: Some(SimpleTimeoutPolicy { timeout: Some(seconds(5)), ..Default::default() }),
            }),
            http_req_retries: Some(HttpRetry {
                simple_retry: Some(SimpleRetryPolicy { attempts: -1, per_try_timeout: None, ..Default::default() }),
            }),
            ..valid_rule()
        };
        assert_eq!(
            validate_route_rule(&rule).unwrap_err().messages(),
            vec!["attempts must be in range [0..]", "perTryTimeout invalid: duration must be set"]
        );
    }

    #[test]
    fn http_faults() {
        let fault = HttpFaultInjection {
            delay: Some(HttpDelay {
                percent: 150.0,
                delay_type: Some(DelayType::ExponentialDelay(millis(10))),
                ..Default::default()
            }),
            abort: Some(HttpAbort {
                percent: 10.0,
                error_type: Some(AbortErrorType::HttpStatus(700)),
                ..Default::default()
            }),
        };
        assert_eq!(
            validate_http_fault(&fault).unwrap_err().messages(),
            vec![
                "percent invalid: percentage 150 is not in range 0..100",
                "exponentialDelay not supported yet",
                "invalid abort http status 700",
            ]
        );

        let grpc = HttpAbort { percent: 1.0, error_type: Some(AbortErrorType::GrpcStatus("UNAVAILABLE".into())), ..Default::default() };
        assert_eq!(validate_abort(&grpc).unwrap_err().as_slice()[0].kind, ViolationKind::Unsupported);
        assert!(validate_delay(&HttpDelay { percent: 5.0, ..Default::default() }).is_err());
    }

    #[test]
    fn l4_faults_are_reported_unimplemented() {
        let rule = RouteRule {
            l4_fault: Some(L4FaultInjection {
                throttle: Some(Throttle {
                    percent: 10.0,
                    downstream_limit_bps: -1,
                    upstream_limit_bps: 10,
                    throttle_after: Some(ThrottleAfter::ThrottleAfterBytes(64.0)),
                }),
                terminate: Some(Terminate { percent: 5.0 }),
            }),
            ..valid_rule()
        };
        assert_eq!(
            validate_route_rule(&rule).unwrap_err().messages(),
            vec![
                "the terminate fault not supported yet",
                "downstreamLimitBps invalid",
                "L4 faults are not implemented",
            ]
        );
    }

    #[test]
    fn appended_headers_need_values() {
        let rule = RouteRule {
            append_headers: [("x-env".to_string(), String::new())].into_iter().collect(),
            ..valid_rule()
        };
        assert_eq!(
            validate_route_rule(&rule).unwrap_err().messages(),
            vec!["appended header \"x-env\" must have a non-empty value"]
        );
    }

    #[test]
    fn ingress_rules() {
        let rule = IngressRule { destination: Some(IstioService::named("reviews")), ..Default::default() };
        assert!(validate_ingress_rule(&rule).is_ok());
        assert!(validate_ingress_rule(&IngressRule::default()).is_err());
    }
}
