//! DNS-1123 labels, fully qualified domain names and wildcard domains.

use lazy_static::lazy_static;
use regex::Regex;

use crate::validation::report::{append_errors, Outcome, Violation};

pub const DNS1123_LABEL_MAX_LENGTH: usize = 63;
pub const DOMAIN_NAME_MAX_LENGTH: usize = 255;

lazy_static! {
    /// One DNS-1123 label: alphanumerics with interior hyphens
    static ref DNS1123_LABEL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9]([-a-zA-Z0-9]*[a-zA-Z0-9])?$").unwrap();

    /// A wildcard label: `*` alone, `*-` followed by a label, or a plain label
    static ref WILDCARD_LABEL_REGEX: Regex =
        Regex::new(r"^(\*|(\*-)?[a-zA-Z0-9]([-a-zA-Z0-9]*[a-zA-Z0-9])?)$").unwrap();
}

/// Whether `value` is a DNS-1123 label (RFC 1123).
pub fn is_dns1123_label(value: &str) -> bool {
    value.len() <= DNS1123_LABEL_MAX_LENGTH && DNS1123_LABEL_REGEX.is_match(value)
}

/// Like [`is_dns1123_label`], but also accepts `*` and `*-`-prefixed labels.
pub fn is_wildcard_dns1123_label(value: &str) -> bool {
    value.len() <= DNS1123_LABEL_MAX_LENGTH && WILDCARD_LABEL_REGEX.is_match(value)
}

fn check_dns1123_preconditions(name: &str) -> Outcome {
    if name.len() > DOMAIN_NAME_MAX_LENGTH {
        return Violation::range(format!(
            "domain name {:?} too long (max {})",
            name, DOMAIN_NAME_MAX_LENGTH
        ))
        .fail();
    }
    if name.is_empty() {
        return Violation::required("empty domain name not allowed").fail();
    }
    Ok(())
}

fn validate_dns1123_labels(domain: &str) -> Outcome {
    match domain.split('.').find(|label| !is_dns1123_label(label)) {
        Some(label) => Violation::format(format!(
            "domain name {:?} invalid (label {:?} invalid)",
            domain, label
        ))
        .fail(),
        None => Ok(()),
    }
}

/// Validate a fully qualified domain name.
///
/// Length and label failures are reported together.
pub fn validate_fqdn(fqdn: &str) -> Outcome {
    append_errors([check_dns1123_preconditions(fqdn), validate_dns1123_labels(fqdn)])
}

/// Validate a domain whose first label may be a wildcard (`*.foo.com`,
/// `*-bar.foo.com`, `*`).
pub fn validate_wildcard_domain(domain: &str) -> Outcome {
    check_dns1123_preconditions(domain)?;

    let (first, rest) = match domain.split_once('.') {
        Some((first, rest)) => (first, Some(rest)),
        None => (domain, None),
    };
    if !is_wildcard_dns1123_label(first) {
        return Violation::format(format!(
            "domain name {:?} invalid (label {:?} invalid)",
            domain, first
        ))
        .fail();
    }
    match rest {
        Some(rest) => validate_dns1123_labels(rest),
        None => Ok(()),
    }
}

/// Validate an egress-rule domain, which follows virtual-host domain rules:
/// `*` alone, or a `*`, `*.` or `*-` prefix before a fully qualified name.
pub fn validate_egress_domain(domain: &str) -> Outcome {
    if domain.is_empty() {
        return Violation::required("domain must not be empty string").fail();
    }

    let mut rest = domain;
    if let Some(stripped) = rest.strip_prefix('*') {
        if stripped.is_empty() {
            return Ok(());
        }
        rest = stripped
            .strip_prefix('.')
            .or_else(|| stripped.strip_prefix('-'))
            .unwrap_or(stripped);
    }
    validate_fqdn(rest)
}

/// Validate a subset name: non-empty and a DNS-1123 label.
pub fn validate_subset_name(name: &str) -> Outcome {
    if name.is_empty() {
        return Violation::required("subset name cannot be empty").fail();
    }
    if !is_dns1123_label(name) {
        return Violation::format(format!("subset name is invalid: {}", name)).fail();
    }
    Ok(())
}

/// Validate a port name: a DNS-1123 label.
pub fn validate_port_name(name: &str) -> Outcome {
    if !is_dns1123_label(name) {
        return Violation::format(format!("invalid port name: {}", name)).fail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns1123_labels() {
        assert!(is_dns1123_label("a"));
        assert!(is_dns1123_label("reviews-v1"));
        assert!(is_dns1123_label("Foo9"));
        assert!(is_dns1123_label(&"a".repeat(63)));
        assert!(!is_dns1123_label(&"a".repeat(64)));
        assert!(!is_dns1123_label(""));
        assert!(!is_dns1123_label("-leading"));
        assert!(!is_dns1123_label("trailing-"));
        assert!(!is_dns1123_label("under_score"));
        assert!(!is_dns1123_label("dot.ted"));
    }

    #[test]
    fn wildcard_labels() {
        assert!(is_wildcard_dns1123_label("*"));
        assert!(is_wildcard_dns1123_label("*-bar"));
        assert!(is_wildcard_dns1123_label("plain"));
        assert!(!is_wildcard_dns1123_label("*bar"));
        assert!(!is_wildcard_dns1123_label("**"));
        assert!(!is_wildcard_dns1123_label("bar*"));
        assert!(!is_wildcard_dns1123_label(""));
    }

    #[test]
    fn fqdn_reports_preconditions_and_labels() {
        assert!(validate_fqdn("reviews.default.svc.cluster.local").is_ok());
        assert!(validate_fqdn("localhost").is_ok());

        let empty = validate_fqdn("").unwrap_err();
        assert_eq!(
            empty.messages(),
            vec![
                "empty domain name not allowed",
                "domain name \"\" invalid (label \"\" invalid)",
            ]
        );

        let long = format!("{}.com", "a.".repeat(130));
        assert_eq!(validate_fqdn(&long).unwrap_err().len(), 1);

        let bad = validate_fqdn("foo..com").unwrap_err();
        assert_eq!(bad.messages(), vec!["domain name \"foo..com\" invalid (label \"\" invalid)"]);
    }

    #[test]
    fn wildcard_domains() {
        assert!(validate_wildcard_domain("*.foo.com").is_ok());
        assert!(validate_wildcard_domain("*-bar.foo.com").is_ok());
        assert!(validate_wildcard_domain("*").is_ok());
        assert!(validate_wildcard_domain("foo.com").is_ok());
        assert!(validate_wildcard_domain("*foo.com").is_err());
        assert!(validate_wildcard_domain("foo.*.com").is_err());
        assert!(validate_wildcard_domain("").is_err());
        assert!(validate_wildcard_domain(&"a".repeat(256)).is_err());
    }

    #[test]
    fn egress_domains() {
        assert!(validate_egress_domain("*").is_ok());
        assert!(validate_egress_domain("*.cnn.com").is_ok());
        assert!(validate_egress_domain("*-bar.cnn.com").is_ok());
        assert!(validate_egress_domain("*cnn.com").is_ok());
        assert!(validate_egress_domain("cnn.com").is_ok());
        assert!(validate_egress_domain("").is_err());
        assert!(validate_egress_domain("*.").is_err());
        assert!(validate_egress_domain("foo.*.com").is_err());
    }

    #[test]
    fn subset_and_port_names() {
        assert!(validate_subset_name("v1").is_ok());
        assert_eq!(
            validate_subset_name("").unwrap_err().messages(),
            vec!["subset name cannot be empty"]
        );
        assert!(validate_subset_name("v1.2").is_err());
        assert!(validate_port_name("http-2").is_ok());
        assert!(validate_port_name("").is_err());
    }
}
