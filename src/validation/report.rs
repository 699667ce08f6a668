//! # Validation Report
//!
//! Violations, the aggregated outcome of a validation call, and the
//! collect-all accumulator used by every validator.
//!
//! An [`Outcome`] is `Ok(())` when nothing is wrong, or `Err(Violations)` with
//! every failure found. Merging outcomes never drops a message and never
//! stops early: `Ok` inputs contribute nothing, `Err` inputs contribute all
//! their violations in order.

use serde::Serialize;
use std::fmt;

/// Category of a failed invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The object handed to a validator is not the kind it validates.
    Shape,
    /// A scalar fails its grammar.
    Format,
    /// A number or duration is outside its legal interval.
    Range,
    /// Fields on the same object are mutually exclusive or jointly required.
    CrossField,
    /// A collection repeats a key that must be unique.
    Uniqueness,
    /// A field is illegal given a discriminator elsewhere in the object.
    ModeDependent,
    /// Well-formed, but not implemented by the data plane.
    Unsupported,
    /// A mandatory field or collection is missing.
    Required,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Shape => write!(f, "shape"),
            ViolationKind::Format => write!(f, "format"),
            ViolationKind::Range => write!(f, "range"),
            ViolationKind::CrossField => write!(f, "cross_field"),
            ViolationKind::Uniqueness => write!(f, "uniqueness"),
            ViolationKind::ModeDependent => write!(f, "mode_dependent"),
            ViolationKind::Unsupported => write!(f, "unsupported"),
            ViolationKind::Required => write!(f, "required"),
        }
    }
}

/// A single violated invariant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new<S: Into<String>>(kind: ViolationKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn shape<S: Into<String>>(message: S) -> Self {
        Self::new(ViolationKind::Shape, message)
    }

    pub fn format<S: Into<String>>(message: S) -> Self {
        Self::new(ViolationKind::Format, message)
    }

    pub fn range<S: Into<String>>(message: S) -> Self {
        Self::new(ViolationKind::Range, message)
    }

    pub fn cross_field<S: Into<String>>(message: S) -> Self {
        Self::new(ViolationKind::CrossField, message)
    }

    pub fn uniqueness<S: Into<String>>(message: S) -> Self {
        Self::new(ViolationKind::Uniqueness, message)
    }

    pub fn mode_dependent<S: Into<String>>(message: S) -> Self {
        Self::new(ViolationKind::ModeDependent, message)
    }

    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        Self::new(ViolationKind::Unsupported, message)
    }

    pub fn required<S: Into<String>>(message: S) -> Self {
        Self::new(ViolationKind::Required, message)
    }

    /// Prepend context such as `"weight invalid:"`, separated by a space.
    pub fn with_prefix(self, prefix: &str) -> Self {
        Self {
            kind: self.kind,
            message: format!("{} {}", prefix, self.message),
        }
    }

    /// Wrap this violation into a failed outcome.
    pub fn fail(self) -> Outcome {
        Err(Violations::from(self))
    }
}

/// An ordered, non-empty list of violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.0
    }

    /// Messages in report order.
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.message.as_str()).collect()
    }

    /// Whether any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|v| v.message.contains(needle))
    }

    pub fn with_prefix(self, prefix: &str) -> Self {
        Self(self.0.into_iter().map(|v| v.with_prefix(prefix)).collect())
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            1 => write!(f, "1 error occurred:")?,
            n => write!(f, "{} errors occurred:", n)?,
        }
        for violation in &self.0 {
            write!(f, "\n\t* {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl From<Violation> for Violations {
    fn from(violation: Violation) -> Self {
        Self(vec![violation])
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of validating one value: nothing wrong, or every violation found.
pub type Outcome = Result<(), Violations>;

/// Merge outcomes. The result is `Ok` iff every input is `Ok`.
pub fn append_errors<I>(outcomes: I) -> Outcome
where
    I: IntoIterator<Item = Outcome>,
{
    let mut errors = ErrorCollector::new();
    for outcome in outcomes {
        errors.check(outcome);
    }
    errors.finish()
}

/// Growable accumulator; every check is recorded and merged once at the end.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    violations: Vec<Violation>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Record the violations of a sub-check, if any.
    pub fn check(&mut self, outcome: Outcome) {
        if let Err(violations) = outcome {
            self.violations.extend(violations);
        }
    }

    /// Record a sub-check's violations, each prefixed with context.
    pub fn check_with_prefix(&mut self, prefix: &str, outcome: Outcome) {
        self.check(outcome.with_prefix(prefix));
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn finish(self) -> Outcome {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(Violations(self.violations))
        }
    }
}

/// Context prefixing for outcomes.
pub trait OutcomeExt {
    fn with_prefix(self, prefix: &str) -> Outcome;
}

impl OutcomeExt for Outcome {
    fn with_prefix(self, prefix: &str) -> Outcome {
        self.map_err(|violations| violations.with_prefix(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing(message: &str) -> Outcome {
        Violation::format(message).fail()
    }

    #[test]
    fn all_ok_inputs_merge_to_ok() {
        assert_eq!(append_errors(Vec::new()), Ok(()));
        assert_eq!(append_errors(vec![Ok(()), Ok(()), Ok(())]), Ok(()));
    }

    #[test]
    fn failures_are_preserved_in_order() {
        let merged = append_errors(vec![Ok(()), failing("first"), Ok(()), failing("second")]).unwrap_err();
        assert_eq!(merged.messages(), vec!["first", "second"]);
    }

    #[test]
    fn merge_is_associative() {
        let left = append_errors(vec![append_errors(vec![failing("a"), failing("b")]), failing("c")]);
        let right = append_errors(vec![failing("a"), append_errors(vec![failing("b"), failing("c")])]);
        assert_eq!(left, right);
    }

    #[test]
    fn prefix_applies_to_each_violation() {
        let mut errors = ErrorCollector::new();
        errors.check_with_prefix(
            "weight invalid:",
            append_errors(vec![failing("too big"), failing("negative")]),
        );
        let violations = errors.finish().unwrap_err();
        assert_eq!(violations.messages(), vec!["weight invalid: too big", "weight invalid: negative"]);
        assert!(violations.iter().all(|v| v.kind == ViolationKind::Format));
    }

    #[test]
    fn display_lists_every_message() {
        let violations = append_errors(vec![failing("one"), failing("two")]).unwrap_err();
        assert_eq!(violations.to_string(), "2 errors occurred:\n\t* one\n\t* two");
        let single = failing("only").unwrap_err();
        assert_eq!(single.to_string(), "1 error occurred:\n\t* only");
    }

    #[test]
    fn serializes_kind_and_message() {
        let violations = Violation::uniqueness("duplicate port: 80").fail().unwrap_err();
        let json = serde_json::to_value(&violations).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"kind": "uniqueness", "message": "duplicate port: 80"}])
        );
    }
}
