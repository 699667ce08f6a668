//! Report formatting for CLI commands
//!
//! Validation results render as plain text for people, or as JSON/YAML for
//! pipelines.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::document::ConfigDocument;
use crate::validation::{ConfigDescriptor, Violation};

/// Result of checking one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub source: String,
    /// Position of the document within its source, starting at 1
    pub index: usize,
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    /// Set when the document could not be decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentReport {
    /// Validate `document` and record the result.
    pub fn check(source: &str, index: usize, document: &ConfigDocument) -> Self {
        let (violations, error) = match document.validate() {
            Ok(Ok(())) => (Vec::new(), None),
            Ok(Err(violations)) => (violations.into_inner(), None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };
        Self {
            source: source.to_string(),
            index,
            kind: document.kind.clone(),
            name: document.name.clone(),
            namespace: document.namespace.clone(),
            valid: violations.is_empty() && error.is_none(),
            violations,
            error,
        }
    }

    /// A source that could not be read or parsed at all.
    pub fn unreadable(source: &str, error: impl std::fmt::Display) -> Self {
        Self {
            source: source.to_string(),
            index: 0,
            kind: String::new(),
            name: String::new(),
            namespace: String::new(),
            valid: false,
            violations: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    fn identity(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

/// Every document checked in one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub documents: Vec<DocumentReport>,
    pub valid: usize,
    pub invalid: usize,
}

impl ValidationReport {
    pub fn push(&mut self, report: DocumentReport) {
        if report.valid {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
        self.documents.push(report);
    }

    pub fn is_valid(&self) -> bool {
        self.invalid == 0
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => to_json(self),
            OutputFormat::Yaml => to_yaml(self),
        }
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        for report in &self.documents {
            let status = if report.valid { "PASS" } else { "FAIL" };
            let location = if report.index == 0 {
                report.source.clone()
            } else {
                format!("{}#{}", report.source, report.index)
            };
            if report.kind.is_empty() {
                let _ = writeln!(out, "{} {}", status, location);
            } else {
                let _ = writeln!(out, "{} {} {} ({})", status, report.kind, report.identity(), location);
            }
            if let Some(error) = &report.error {
                let _ = writeln!(out, "  error: {}", error);
            }
            for violation in &report.violations {
                let _ = writeln!(out, "  - [{}] {}", violation.kind, violation.message);
            }
        }
        let _ = write!(
            out,
            "{} document(s) checked, {} valid, {} invalid",
            self.documents.len(),
            self.valid,
            self.invalid
        );
        out
    }
}

/// Render the registered schemas.
pub fn render_kinds(descriptor: &ConfigDescriptor, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(descriptor),
        OutputFormat::Yaml => to_yaml(descriptor),
        OutputFormat::Text => {
            let columns = [("TYPE", 24), ("PLURAL", 26), ("SCOPE", 10), ("MESSAGE", 0)];
            let mut out = table_header(&columns);
            for schema in descriptor.schemas() {
                let scope = if schema.cluster_scoped { "cluster" } else { "namespace" };
                let _ = writeln!(
                    out,
                    "{:<24} {:<26} {:<10} {}",
                    schema.type_name, schema.plural, scope, schema.message_name
                );
            }
            Ok(out.trim_end().to_string())
        }
    }
}

/// Serialize as pretty JSON
pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize to JSON")
}

/// Serialize as YAML
pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yaml::to_string(data).context("Failed to serialize to YAML")
}

/// Header row plus separator for a fixed-width table
fn table_header(columns: &[(&str, usize)]) -> String {
    let mut header = String::new();
    for (name, width) in columns {
        header.push_str(&format!("{:<width$} ", name, width = width));
    }
    let header = header.trim_end().to_string();
    let separator = "-".repeat(header.len());
    format!("{}\n{}\n", header, separator)
}
