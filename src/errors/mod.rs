//! # Error Handling
//!
//! Errors raised by the outer surface of meshguard: loading settings, reading
//! and decoding configuration documents, and resolving resource kinds.
//!
//! Validation findings themselves are not errors in this sense. Validators
//! return [`Violations`](crate::validation::report::Violations); they only
//! become a [`MeshguardError::Validation`] when a caller needs to surface a
//! rejected document through `?`.

use crate::validation::report::Violations;

/// Custom result type for meshguard operations
pub type Result<T> = std::result::Result<T, MeshguardError>;

/// Main error type for meshguard
#[derive(thiserror::Error, Debug)]
pub enum MeshguardError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O errors
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// JSON decoding errors
    #[error("JSON error: {context}")]
    Json {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// YAML decoding errors
    #[error("YAML error: {context}")]
    Yaml {
        #[source]
        source: serde_yaml::Error,
        context: String,
    },

    /// A resource failed validation
    #[error("{kind} {identity} is invalid: {violations}")]
    Validation {
        kind: String,
        identity: String,
        violations: Violations,
    },

    /// Settings failed their own field checks
    #[error("Invalid settings: {message}")]
    Settings { message: String },

    /// A document names a kind with no registered validator
    #[error("unknown resource kind {kind:?}")]
    UnknownKind { kind: String },
}

impl MeshguardError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    /// Wrap the violations of a rejected resource. The identity is
    /// `namespace/name`, or just `name` for cluster-scoped resources.
    pub fn validation<K, N>(kind: K, name: N, namespace: &str, violations: Violations) -> Self
    where
        K: Into<String>,
        N: Into<String>,
    {
        let name = name.into();
        let identity = if namespace.is_empty() { name } else { format!("{}/{}", namespace, name) };
        Self::Validation {
            kind: kind.into(),
            identity,
            violations,
        }
    }

    /// Create an unknown kind error
    pub fn unknown_kind<S: Into<String>>(kind: S) -> Self {
        Self::UnknownKind { kind: kind.into() }
    }

    /// Add context to an error
    pub fn context<S: Into<String>>(mut self, context: S) -> Self {
        let context = context.into();
        match &mut self {
            MeshguardError::Io { context: ctx, .. }
            | MeshguardError::Json { context: ctx, .. }
            | MeshguardError::Yaml { context: ctx, .. } => {
                *ctx = format!("{}: {}", context, ctx);
            }
            MeshguardError::Config { message, .. } => {
                *message = format!("{}: {}", context, message);
            }
            _ => {}
        }
        self
    }

    /// Process exit code the CLI reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            MeshguardError::Validation { .. } => 1,
            MeshguardError::Json { .. }
            | MeshguardError::Yaml { .. }
            | MeshguardError::UnknownKind { .. } => 65,
            MeshguardError::Io { .. } => 74,
            MeshguardError::Config { .. } | MeshguardError::Settings { .. } => 78,
        }
    }
}

impl From<std::io::Error> for MeshguardError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error, "I/O operation failed")
    }
}

impl From<serde_json::Error> for MeshguardError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            source: error,
            context: "JSON decoding failed".to_string(),
        }
    }
}

impl From<serde_yaml::Error> for MeshguardError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Yaml {
            source: error,
            context: "YAML decoding failed".to_string(),
        }
    }
}

impl From<config::ConfigError> for MeshguardError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for MeshguardError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        flatten_validation_errors("", &errors, &mut fields);
        fields.sort();

        Self::Settings { message: fields.join("; ") }
    }
}

/// Collect `path: message` entries, descending into nested structs and lists.
fn flatten_validation_errors(prefix: &str, errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or_else(|| e.code.to_string(), |m| m.to_string()))
                    .collect();
                out.push(format!("{}: {}", path, messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => flatten_validation_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten_validation_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}
