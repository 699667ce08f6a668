use crate::domain::{CorsPolicy, PortSelector, PortSelectorValue, StringMatch};
use crate::validation::primitives::{
    validate_duration, validate_http_header_name, validate_http_method, validate_port,
    validate_port_name,
};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

/// A string match must carry one of its variants.
pub(crate) fn validate_string_match(value: &StringMatch) -> Outcome {
    match value.match_type {
        Some(_) => Ok(()),
        None => Violation::format("unrecognized string match: must set exact, prefix or regex").fail(),
    }
}

/// A port selector names a port or gives its number.
pub(crate) fn validate_port_selector(selector: &PortSelector) -> Outcome {
    match &selector.port {
        Some(PortSelectorValue::Number(number)) => validate_port(i64::from(*number)),
        Some(PortSelectorValue::Name(name)) if name.is_empty() => {
            Violation::required("port selector name cannot be empty").fail()
        }
        Some(PortSelectorValue::Name(name)) => validate_port_name(name),
        None => Violation::required("port selector must set a name or a number").fail(),
    }
}

pub(crate) fn validate_cors_policy(policy: &CorsPolicy) -> Outcome {
    let mut errors = ErrorCollector::new();

    for method in &policy.allow_methods {
        errors.check(validate_http_method(method));
    }
    for name in &policy.allow_headers {
        errors.check(validate_http_header_name(name));
    }
    for name in &policy.expose_headers {
        errors.check(validate_http_header_name(name));
    }

    if let Some(max_age) = &policy.max_age {
        errors.check(validate_duration(max_age));
        if max_age.nanos != 0 {
            errors.push(Violation::format(
                "max_age duration is accurate only to seconds precision",
            ));
        }
    }

    errors.finish()
}

/// Names of appended headers must be valid header names.
pub(crate) fn validate_append_header_names<'a, I>(names: I) -> Outcome
where
    I: IntoIterator<Item = &'a String>,
{
    let mut errors = ErrorCollector::new();
    for name in names {
        errors.check(validate_http_header_name(name));
    }
    errors.finish()
}
