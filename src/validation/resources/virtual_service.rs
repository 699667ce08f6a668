use crate::domain::common::{AbortErrorType, DelayType, HttpRedirect, HttpRewrite};
use crate::domain::networking::{
    Abort, Delay, Destination, DestinationWeight, HttpFaultInjection, HttpRetry, HttpRoute,
    L4MatchAttributes, TcpRoute, VirtualService, MESH_GATEWAY,
};
use crate::domain::Hostname;
use crate::validation::primitives::{
    is_dns1123_label, validate_duration, validate_host_or_subnet, validate_http_header_name,
    validate_http_status, validate_ipv4_subnet, validate_labels, validate_percent, validate_port,
    validate_subset_name,
};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

use super::helpers::{validate_append_header_names, validate_cors_policy, validate_port_selector};

/// Validate a virtual service: gateways, hosts, HTTP and TCP routes.
pub fn validate_virtual_service(service: &VirtualService) -> Outcome {
    let mut errors = ErrorCollector::new();

    let mut applies_to_mesh = service.gateways.is_empty();
    for gateway in &service.gateways {
        if !is_dns1123_label(gateway) {
            errors.push(Violation::format(format!(
                "gateway is not a valid DNS1123 label: {}",
                gateway
            )));
        }
        if gateway == MESH_GATEWAY {
            applies_to_mesh = true;
        }
    }

    if service.hosts.is_empty() {
        errors.push(Violation::required("virtual service must have at least one host"));
    }

    let mut all_hosts_valid = true;
    for host in &service.hosts {
        if let Err(violations) = validate_host_or_subnet(host) {
            errors.check(Err(violations));
            all_hosts_valid = false;
        } else if applies_to_mesh && host == "*" {
            errors.push(Violation::mode_dependent(
                "wildcard host * is not allowed for virtual services bound to the mesh gateway",
            ));
            all_hosts_valid = false;
        }
    }

    // literal duplicates and overlapping wildcards
    if all_hosts_valid {
        let hosts: Vec<Hostname> = service.hosts.iter().map(|h| Hostname::from(h.as_str())).collect();
        for (i, host) in hosts.iter().enumerate() {
            for other in &hosts[i + 1..] {
                if host.matches(other) {
                    errors.push(Violation::uniqueness(format!(
                        "duplicate hosts in virtual service: {} & {}",
                        host, other
                    )));
                }
            }
        }
    }

    if service.http.is_empty() && service.tcp.is_empty() {
        errors.push(Violation::required("http or tcp must be provided in virtual service"));
    }
    for route in &service.http {
        errors.check(validate_http_route(route));
    }
    for route in &service.tcp {
        errors.check(validate_tcp_route(route));
    }

    errors.finish()
}

pub fn validate_http_route(http: &HttpRoute) -> Outcome {
    let mut errors = ErrorCollector::new();

    if http.redirect.is_some() {
        if !http.route.is_empty() {
            errors.push(Violation::cross_field("HTTP route cannot contain both route and redirect"));
        }
        if http.fault.is_some() {
            errors.push(Violation::cross_field("HTTP route cannot contain both fault and redirect"));
        }
        if http.rewrite.is_some() {
            errors.push(Violation::cross_field(
                "HTTP route rule cannot contain both rewrite and redirect",
            ));
        }
        if http.websocket_upgrade {
            errors.push(Violation::cross_field(
                "WebSocket upgrade is not allowed on redirect rules",
            ));
        }
    } else if http.route.is_empty() {
        errors.push(Violation::required("HTTP route or redirect is required"));
    }

    errors.check(validate_append_header_names(http.append_headers.keys()));
    if let Some(cors) = &http.cors_policy {
        errors.check(validate_cors_policy(cors));
    }
    if let Some(fault) = &http.fault {
        errors.check(validate_http_fault_injection(fault));
    }

    for request in &http.match_ {
        for name in request.headers.keys() {
            errors.check(validate_http_header_name(name));
        }
        errors.check(validate_labels(&request.source_labels));
    }

    if let Some(mirror) = &http.mirror {
        errors.check(validate_destination(mirror));
    }
    if let Some(redirect) = &http.redirect {
        errors.check(validate_http_redirect(redirect));
    }
    if let Some(retries) = &http.retries {
        errors.check(validate_http_retry(retries));
    }
    if let Some(rewrite) = &http.rewrite {
        errors.check(validate_http_rewrite(rewrite));
    }
    errors.check(validate_route_destinations(&http.route));
    if let Some(timeout) = &http.timeout {
        errors.check(validate_duration(timeout));
    }

    errors.finish()
}

/// Destinations and weights of a route list. With more than one entry the
/// weights may total at most 100.
fn validate_route_destinations(routes: &[DestinationWeight]) -> Outcome {
    let mut errors = ErrorCollector::new();
    let mut total_weight: i64 = 0;
    for route in routes {
        match &route.destination {
            Some(destination) => errors.check(validate_destination(destination)),
            None => errors.push(Violation::required("destination is required")),
        }
        errors.check(validate_percent(route.weight));
        total_weight += i64::from(route.weight);
    }
    if routes.len() > 1 && total_weight > 100 {
        errors.push(Violation::range(format!(
            "total destination weight {} > 100",
            total_weight
        )));
    }
    errors.finish()
}

pub fn validate_tcp_route(tcp: &TcpRoute) -> Outcome {
    let mut errors = ErrorCollector::new();
    for attributes in &tcp.match_ {
        errors.check(validate_l4_match(attributes));
    }
    if tcp.route.is_empty() {
        errors.push(Violation::required("TCP route is required"));
    }
    errors.check(validate_route_destinations(&tcp.route));
    errors.finish()
}

fn validate_l4_match(attributes: &L4MatchAttributes) -> Outcome {
    let mut errors = ErrorCollector::new();
    for subnet in &attributes.destination_subnets {
        errors.check(validate_ipv4_subnet(subnet));
    }
    if attributes.port != 0 {
        errors.check(validate_port(i64::from(attributes.port)));
    }
    errors.check(validate_labels(&attributes.source_labels));
    for gateway in &attributes.gateways {
        if !is_dns1123_label(gateway) {
            errors.push(Violation::format(format!(
                "gateway is not a valid DNS1123 label: {}",
                gateway
            )));
        }
    }
    errors.finish()
}

pub fn validate_http_fault_injection(fault: &HttpFaultInjection) -> Outcome {
    let mut errors = ErrorCollector::new();
    if fault.abort.is_none() && fault.delay.is_none() {
        errors.push(Violation::required(
            "HTTP fault injection must have an abort and/or a delay",
        ));
    }
    if let Some(abort) = &fault.abort {
        errors.check(validate_fault_abort(abort));
    }
    if let Some(delay) = &fault.delay {
        errors.check(validate_fault_delay(delay));
    }
    errors.finish()
}

fn validate_fault_abort(abort: &Abort) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check(validate_percent(abort.percent));
    match &abort.error_type {
        Some(AbortErrorType::GrpcStatus(_)) => {
            errors.push(Violation::unsupported("gRPC abort fault injection not supported yet"));
        }
        Some(AbortErrorType::Http2Error(_)) => {
            errors.push(Violation::unsupported(
                "HTTP/2 abort fault injection not supported yet",
            ));
        }
        Some(AbortErrorType::HttpStatus(status)) => errors.check(validate_http_status(*status)),
        None => errors.push(Violation::required("abort must set an error type")),
    }
    errors.finish()
}

fn validate_fault_delay(delay: &Delay) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check(validate_percent(delay.percent));
    match &delay.delay_type {
        Some(DelayType::FixedDelay(fixed)) => errors.check(validate_duration(fixed)),
        Some(DelayType::ExponentialDelay(exponential)) => {
            errors.check(validate_duration(exponential));
            errors.push(Violation::unsupported("exponentialDelay not supported yet"));
        }
        None => errors.push(Violation::required(
            "delay must set fixedDelay or exponentialDelay",
        )),
    }
    errors.finish()
}

pub fn validate_destination(destination: &Destination) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check(validate_host_or_subnet(&destination.host));
    if !destination.subset.is_empty() {
        errors.check(validate_subset_name(&destination.subset));
    }
    if let Some(port) = &destination.port {
        errors.check(validate_port_selector(port));
    }
    errors.finish()
}

fn validate_http_retry(retries: &HttpRetry) -> Outcome {
    let mut errors = ErrorCollector::new();
    if retries.attempts <= 0 {
        errors.push(Violation::range("attempts must be positive"));
    }
    if let Some(per_try_timeout) = &retries.per_try_timeout {
        errors.check(validate_duration(per_try_timeout));
    }
    errors.finish()
}

fn validate_http_redirect(redirect: &HttpRedirect) -> Outcome {
    if redirect.uri.is_empty() && redirect.authority.is_empty() {
        return Violation::required("redirect must specify URI, authority, or both").fail();
    }
    Ok(())
}

fn validate_http_rewrite(rewrite: &HttpRewrite) -> Outcome {
    if rewrite.uri.is_empty() && rewrite.authority.is_empty() {
        return Violation::required("rewrite must specify URI, authority, or both").fail();
    }
    Ok(())
}
