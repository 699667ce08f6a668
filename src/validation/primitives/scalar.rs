//! Percentages, label maps and protocol names.

use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::{Labels, Protocol};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

lazy_static! {
    /// Label keys and values: a permissive qualified-name grammar
    static ref TAG_REGEX: Regex = Regex::new(r"^[-A-Za-z0-9_./]*$").unwrap();
}

/// Validate an integer percentage: `0..=100`.
pub fn validate_percent(value: i32) -> Outcome {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        Violation::range(format!("percentage {} is not in range 0..100", value)).fail()
    }
}

/// Validate a float percentage: `0.0..=100.0`. NaN is rejected.
pub fn validate_float_percent(value: f32) -> Outcome {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Violation::range(format!("percentage {} is not in range 0..100", value)).fail()
    }
}

/// Validate every key and value of a label map.
pub fn validate_labels(labels: &Labels) -> Outcome {
    let mut errors = ErrorCollector::new();
    for (key, value) in labels {
        if !TAG_REGEX.is_match(key) {
            errors.push(Violation::format(format!("invalid tag key: {:?}", key)));
        }
        if !TAG_REGEX.is_match(value) {
            errors.push(Violation::format(format!("invalid tag value: {:?}", value)));
        }
    }
    errors.finish()
}

/// Validate that a protocol name is in the protocol table.
pub fn validate_protocol(name: &str) -> Outcome {
    if Protocol::parse(name).is_supported() {
        Ok(())
    } else {
        Violation::unsupported(format!("unsupported protocol: {}", name)).fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_percentages() {
        assert!(validate_percent(0).is_ok());
        assert!(validate_percent(100).is_ok());
        assert!(validate_percent(-1).is_err());
        assert_eq!(
            validate_percent(101).unwrap_err().messages(),
            vec!["percentage 101 is not in range 0..100"]
        );
    }

    #[test]
    fn float_percentages() {
        assert!(validate_float_percent(0.0).is_ok());
        assert!(validate_float_percent(99.5).is_ok());
        assert!(validate_float_percent(100.0).is_ok());
        assert!(validate_float_percent(100.1).is_err());
        assert!(validate_float_percent(-0.5).is_err());
        assert!(validate_float_percent(f32::NAN).is_err());
    }

    #[test]
    fn labels_report_each_bad_entry() {
        assert!(validate_labels(&Labels::new()).is_ok());

        let good = Labels::from([("app".to_string(), "reviews".to_string())]);
        assert!(validate_labels(&good).is_ok());

        let bad = Labels::from([
            ("app name".to_string(), "ok".to_string()),
            ("version".to_string(), "v1!".to_string()),
        ]);
        assert_eq!(
            validate_labels(&bad).unwrap_err().messages(),
            vec!["invalid tag key: \"app name\"", "invalid tag value: \"v1!\""]
        );
    }

    #[test]
    fn protocols() {
        assert!(validate_protocol("HTTP").is_ok());
        assert!(validate_protocol("redis").is_ok());
        assert_eq!(
            validate_protocol("SMTP").unwrap_err().messages(),
            vec!["unsupported protocol: SMTP"]
        );
    }
}
