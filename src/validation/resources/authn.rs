use std::collections::HashSet;

use url::Url;

use crate::domain::authn::{
    Jwt, PeerMethod, Policy, TargetSelector, DEFAULT_AUTHENTICATION_POLICY_NAME,
};
use crate::validation::primitives::is_dns1123_label;
use crate::validation::report::{ErrorCollector, Outcome, Violation};

use super::helpers::validate_port_selector;

/// Where a JWKS document would be fetched from. Nothing is fetched here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwksEndpoint {
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
}

/// Split a JWKS URI into host, port and transport. Only `http` (port 80 by
/// default) and `https` (443) are accepted.
pub fn parse_jwks_uri(jwks_uri: &str) -> Result<JwksEndpoint, Violation> {
    let url = Url::parse(jwks_uri)
        .map_err(|e| Violation::format(format!("invalid jwks uri {:?}: {}", jwks_uri, e)))?;

    let use_ssl = match url.scheme() {
        "http" => false,
        "https" => true,
        other => {
            return Err(Violation::unsupported(format!(
                "URI scheme {:?} is not supported",
                other
            )))
        }
    };
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| Violation::required(format!("jwks uri {:?} has no host", jwks_uri)))?;
    let port = url.port_or_known_default().unwrap_or(if use_ssl { 443 } else { 80 });

    Ok(JwksEndpoint { host: host.to_string(), port, use_ssl })
}

pub fn validate_jwt(jwt: &Jwt) -> Outcome {
    let mut errors = ErrorCollector::new();
    if jwt.issuer.is_empty() {
        errors.push(Violation::required("issuer must be set"));
    }
    if jwt.audiences.iter().any(String::is_empty) {
        errors.push(Violation::required("audience must be non-empty string"));
    }
    if !jwt.jwks_uri.is_empty() {
        if let Err(violation) = parse_jwks_uri(&jwt.jwks_uri) {
            errors.push(violation);
        }
    }
    for location in &jwt.jwt_headers {
        if location.is_empty() {
            errors.push(Violation::required("location header must be non-empty string"));
        }
    }
    for location in &jwt.jwt_params {
        if location.is_empty() {
            errors.push(Violation::required("location query must be non-empty string"));
        }
    }
    errors.finish()
}

fn validate_target(target: &TargetSelector) -> Outcome {
    let mut errors = ErrorCollector::new();
    // targets are short names
    if !is_dns1123_label(&target.name) {
        errors.push(Violation::format(format!(
            "target name {:?} must be a valid label",
            target.name
        )));
    }
    for port in &target.ports {
        errors.check(validate_port_selector(port));
    }
    errors.finish()
}

/// Validate an authentication policy. An empty namespace marks a
/// cluster-scoped policy.
pub fn validate_authentication_policy(name: &str, namespace: &str, policy: &Policy) -> Outcome {
    let mut errors = ErrorCollector::new();
    let is_default = name == DEFAULT_AUTHENTICATION_POLICY_NAME;

    if namespace.is_empty() {
        if !is_default {
            errors.push(Violation::mode_dependent(format!(
                "cluster-scoped authentication policy name must be {:?}, found {:?}",
                DEFAULT_AUTHENTICATION_POLICY_NAME, name
            )));
        }
        if !policy.targets.is_empty() {
            errors.push(Violation::mode_dependent(
                "cluster-scoped authentication policy must not have targets",
            ));
        }
    } else {
        if policy.targets.is_empty() && !is_default {
            errors.push(Violation::cross_field(format!(
                "authentication policy with no target rules must be named {:?}, found {:?}",
                DEFAULT_AUTHENTICATION_POLICY_NAME, name
            )));
        }
        if !policy.targets.is_empty() && is_default {
            errors.push(Violation::cross_field(format!(
                "authentication policy with name {:?} must not have any target rules",
                name
            )));
        }
        for target in &policy.targets {
            errors.check(validate_target(target));
        }
    }

    let mut issuers = HashSet::new();
    let mut check_jwt = |jwt: &Jwt, errors: &mut ErrorCollector| {
        if !issuers.insert(jwt.issuer.clone()) {
            errors.push(Violation::uniqueness(format!(
                "jwt with issuer {:?} already defined",
                jwt.issuer
            )));
        }
        errors.check(validate_jwt(jwt));
    };

    for peer in &policy.peers {
        match &peer.params {
            Some(PeerMethod::Jwt(jwt)) => check_jwt(jwt, &mut errors),
            Some(PeerMethod::Mtls(_)) => {}
            None => errors.push(Violation::required(
                "peer authentication method must set mtls or jwt",
            )),
        }
    }
    for origin in &policy.origins {
        match &origin.jwt {
            Some(jwt) => check_jwt(jwt, &mut errors),
            None => errors.push(Violation::required(
                "origin authentication method must set jwt",
            )),
        }
    }

    errors.finish()
}
