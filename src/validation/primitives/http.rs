//! HTTP header names, methods and status codes.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::validation::report::{Outcome, Violation};

/// Methods a route may allow.
static SUPPORTED_METHODS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "CONNECT", "OPTIONS", "TRACE",
    ])
});

/// Validate a header name: non-empty and lower case.
pub fn validate_http_header_name(name: &str) -> Outcome {
    if name.is_empty() {
        return Violation::required("header name cannot be empty").fail();
    }
    if name.chars().any(char::is_uppercase) {
        return Violation::format(format!("header name {:?} must be in lower case", name)).fail();
    }
    Ok(())
}

/// Validate an HTTP method against the supported set. Matching is exact.
pub fn validate_http_method(method: &str) -> Outcome {
    if SUPPORTED_METHODS.contains(method) {
        Ok(())
    } else {
        Violation::format(format!("{:?} is not a supported HTTP method", method)).fail()
    }
}

/// Validate an HTTP status code: `0..=600`.
pub fn validate_http_status(status: i32) -> Outcome {
    if (0..=600).contains(&status) {
        Ok(())
    } else {
        Violation::range(format!("HTTP status {} is not in range 0-600", status)).fail()
    }
}
