//! # Configuration Documents
//!
//! The outer form resources arrive in: a kind, an identity and an untyped
//! spec body. Documents are read from YAML (one or more `---` separated
//! documents) or JSON (a single object or an array of objects), then the spec
//! is decoded into the typed shape registered for the kind.
//!
//! Both a flat form and the Kubernetes-style `metadata` block are accepted:
//!
//! ```yaml
//! kind: Gateway
//! metadata:
//!   name: ingress
//!   namespace: istio-system
//! spec:
//!   servers: []
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{MeshguardError, Result};
use crate::validation::{validate_config, ConfigSpec, Outcome, ResourceKind};

/// A resource as read from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct ConfigDocument {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub spec: serde_json::Value,
}

#[derive(Deserialize)]
struct ObjectMeta {
    #[serde(default)]
    name: String,
    #[serde(default)]
    namespace: String,
}

#[derive(Deserialize)]
struct RawDocument {
    kind: String,
    name: Option<String>,
    namespace: Option<String>,
    metadata: Option<ObjectMeta>,
    #[serde(default)]
    spec: serde_json::Value,
}

impl From<RawDocument> for ConfigDocument {
    fn from(raw: RawDocument) -> Self {
        let (meta_name, meta_namespace) = match raw.metadata {
            Some(meta) => (meta.name, meta.namespace),
            None => (String::new(), String::new()),
        };
        Self {
            kind: raw.kind,
            name: raw.name.unwrap_or(meta_name),
            namespace: raw.namespace.unwrap_or(meta_namespace),
            spec: raw.spec,
        }
    }
}

impl ConfigDocument {
    pub fn new<K, N>(kind: K, name: N, namespace: &str, spec: serde_json::Value) -> Self
    where
        K: Into<String>,
        N: Into<String>,
    {
        Self {
            kind: kind.into(),
            name: name.into(),
            namespace: namespace.to_string(),
            spec,
        }
    }

    /// The registered kind this document names.
    pub fn resource_kind(&self) -> Result<ResourceKind> {
        self.kind.parse()
    }

    /// Decode the spec body into its typed shape. A missing body decodes as
    /// an empty resource.
    pub fn to_spec(&self) -> Result<ConfigSpec> {
        let kind = self.resource_kind()?;
        let body = match &self.spec {
            serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
            other => other.clone(),
        };
        ConfigSpec::from_value(kind, body)
    }

    /// Validate the document. Errors mean the document could not be decoded;
    /// violations come back inside the `Outcome`.
    pub fn validate(&self) -> Result<Outcome> {
        let spec = self.to_spec()?;
        Ok(validate_config(spec.kind(), &self.name, &self.namespace, &spec))
    }

    /// Like [`validate`](Self::validate), with violations surfaced as an error.
    pub fn check(&self) -> Result<()> {
        self.validate()?
            .map_err(|violations| {
                MeshguardError::validation(self.kind.clone(), self.name.clone(), &self.namespace, violations)
            })
    }

    /// `namespace/name`, or `name` alone when there is no namespace.
    pub fn identity(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

/// Parse a YAML stream of one or more documents. Empty documents are skipped.
pub fn parse_yaml_documents(text: &str) -> Result<Vec<ConfigDocument>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = serde_yaml::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        documents.push(serde_yaml::from_value(value)?);
    }
    Ok(documents)
}

/// Parse a JSON object or an array of objects.
pub fn parse_json_documents(text: &str) -> Result<Vec<ConfigDocument>> {
    match serde_json::from_str::<serde_json::Value>(text)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(MeshguardError::from))
            .collect(),
        value => Ok(vec![serde_json::from_value(value)?]),
    }
}

/// Read every document in a file. `.json` files are parsed as JSON, anything
/// else as YAML.
#[instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn load_documents(path: &Path) -> Result<Vec<ConfigDocument>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| MeshguardError::io(e, format!("reading {}", path.display())))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json { parse_json_documents(&text) } else { parse_yaml_documents(&text) };
    let documents = parsed.map_err(|e| e.context(path.display().to_string()))?;

    debug!(documents = documents.len(), "loaded configuration documents");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GATEWAYS: &str = r#"
kind: Gateway
metadata:
  name: ingress
  namespace: istio-system
spec:
  servers:
  - port: {number: 80, protocol: HTTP, name: http}
    hosts: ["*.example.com"]
---
---
kind: gateway
name: empty
namespace: default
"#;

    #[test]
    fn yaml_streams_accept_both_identity_forms() {
        let documents = parse_yaml_documents(GATEWAYS).unwrap();
        assert_eq!(documents.len(), 2);

        assert_eq!(documents[0].identity(), "istio-system/ingress");
        assert_eq!(documents[0].resource_kind().unwrap(), ResourceKind::Gateway);
        assert!(documents[0].validate().unwrap().is_ok());

        assert_eq!(documents[1].identity(), "default/empty");
        assert_eq!(documents[1].spec, serde_json::Value::Null);
        assert_eq!(
            documents[1].validate().unwrap().unwrap_err().messages(),
            vec!["gateway must have at least one server"]
        );
    }

    #[test]
    fn json_accepts_objects_and_arrays() {
        let single = r#"{"kind": "RbacConfig", "name": "default", "spec": {"mode": "ON"}}"#;
        let documents = parse_json_documents(single).unwrap();
        assert_eq!(documents.len(), 1);
        assert!(documents[0].check().is_ok());

        let many = r#"[{"kind": "rbac-config", "name": "a"}, {"kind": "rbac-config", "name": "b", "spec": {"mode": "ON_WITH_INCLUSION"}}]"#;
        let documents = parse_json_documents(many).unwrap();
        assert_eq!(documents.len(), 2);
        assert!(matches!(documents[1].check(), Err(MeshguardError::Validation { .. })));
    }

    #[test]
    fn unknown_kinds_and_bad_bodies_are_errors() {
        let document = ConfigDocument::new("Widget", "w", "default", json!({}));
        assert!(matches!(document.validate(), Err(MeshguardError::UnknownKind { .. })));

        let document = ConfigDocument::new("gateway", "g", "default", json!({"servers": 3}));
        assert!(matches!(document.validate(), Err(MeshguardError::Json { .. })));

        assert!(parse_yaml_documents("kind: [").is_err());
        assert!(parse_yaml_documents("spec: {}").is_err());
    }

    #[test]
    fn load_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("gateways.yaml");
        std::fs::write(&yaml, GATEWAYS).unwrap();
        assert_eq!(load_documents(&yaml).unwrap().len(), 2);

        let json = dir.path().join("rbac.json");
        std::fs::write(&json, r#"{"kind": "RbacConfig", "name": "default"}"#).unwrap();
        assert_eq!(load_documents(&json).unwrap()[0].kind, "RbacConfig");

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(load_documents(&missing), Err(MeshguardError::Io { .. })));
    }
}
