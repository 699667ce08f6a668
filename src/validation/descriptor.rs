//! Config descriptor: the set of resource schemas a store accepts, and its
//! self-consistency check.

use std::collections::HashSet;

use serde::Serialize;

use crate::validation::primitives::is_dns1123_label;
use crate::validation::registry::ResourceKind;
use crate::validation::report::{ErrorCollector, Outcome, Violation};

/// One registered schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSchema {
    #[serde(rename = "type")]
    pub type_name: String,
    pub plural: String,
    pub message_name: String,
    pub cluster_scoped: bool,
    /// Validator that handles documents of this schema.
    pub kind: ResourceKind,
}

impl ConfigSchema {
    /// Schema for a kind under its own type, plural and message names.
    pub fn for_kind(kind: ResourceKind) -> Self {
        Self {
            type_name: kind.as_str().to_string(),
            plural: kind.plural(),
            message_name: kind.message_name().to_string(),
            cluster_scoped: kind.is_cluster_scoped(),
            kind,
        }
    }
}

/// Ordered list of schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigDescriptor(pub Vec<ConfigSchema>);

impl ConfigDescriptor {
    /// Every registered kind, plus the cluster-scoped `mesh-policy` that
    /// shares the authentication policy message.
    pub fn builtin() -> Self {
        let mut schemas: Vec<ConfigSchema> =
            ResourceKind::ALL.iter().copied().map(ConfigSchema::for_kind).collect();
        schemas.push(ConfigSchema {
            type_name: "mesh-policy".to_string(),
            plural: "mesh-policies".to_string(),
            message_name: ResourceKind::AuthenticationPolicy.message_name().to_string(),
            cluster_scoped: true,
            kind: ResourceKind::AuthenticationPolicy,
        });
        Self(schemas)
    }

    pub fn schemas(&self) -> &[ConfigSchema] {
        &self.0
    }

    pub fn get_by_type(&self, type_name: &str) -> Option<&ConfigSchema> {
        self.0.iter().find(|schema| schema.type_name == type_name)
    }

    pub fn types(&self) -> Vec<&str> {
        self.0.iter().map(|schema| schema.type_name.as_str()).collect()
    }

    /// Type and plural are DNS-1123 labels, message names are known, types
    /// are unique, and a message is registered at most once per scope.
    pub fn validate(&self) -> Outcome {
        let mut errors = ErrorCollector::new();
        let known_messages: HashSet<&str> =
            ResourceKind::ALL.iter().map(|kind| kind.message_name()).collect();
        let mut types = HashSet::new();
        let mut messages = HashSet::new();
        let mut cluster_messages = HashSet::new();

        for schema in &self.0 {
            if !is_dns1123_label(&schema.type_name) {
                errors.push(Violation::format(format!("invalid type: {:?}", schema.type_name)));
            }
            if !is_dns1123_label(&schema.plural) {
                errors.push(Violation::format(format!("invalid plural: {:?}", schema.plural)));
            }
            if !known_messages.contains(schema.message_name.as_str()) {
                errors.push(Violation::format(format!(
                    "cannot discover proto message type: {:?}",
                    schema.message_name
                )));
            }
            if !types.insert(schema.type_name.as_str()) {
                errors.push(Violation::uniqueness(format!("duplicate type: {:?}", schema.type_name)));
            }
            let scope = if schema.cluster_scoped { &mut cluster_messages } else { &mut messages };
            if !scope.insert(schema.message_name.as_str()) {
                errors.push(Violation::uniqueness(format!(
                    "duplicate message type: {:?}",
                    schema.message_name
                )));
            }
        }

        errors.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(type_name: &str, plural: &str, message_name: &str, cluster_scoped: bool) -> ConfigSchema {
        ConfigSchema {
            type_name: type_name.into(),
            plural: plural.into(),
            message_name: message_name.into(),
            cluster_scoped,
            kind: ResourceKind::RouteRule,
        }
    }

    #[test]
    fn builtin_descriptor_is_valid() {
        let descriptor = ConfigDescriptor::builtin();
        assert!(descriptor.validate().is_ok());
        assert_eq!(descriptor.schemas().len(), ResourceKind::ALL.len() + 1);
        assert_eq!(
            descriptor.get_by_type("mesh-policy").map(|s| s.kind),
            Some(ResourceKind::AuthenticationPolicy)
        );
        assert!(descriptor.types().contains(&"virtual-service"));
    }

    #[test]
    fn bad_names_and_unknown_messages() {
        let descriptor = ConfigDescriptor(vec![schema(
            "Route_Rule",
            "route rules",
            "istio.routing.v1alpha1.Unknown",
            false,
        )]);
        assert_eq!(
            descriptor.validate().unwrap_err().messages(),
            vec![
                "invalid type: \"Route_Rule\"",
                "invalid plural: \"route rules\"",
                "cannot discover proto message type: \"istio.routing.v1alpha1.Unknown\"",
            ]
        );
    }

    #[test]
    fn duplicates_are_scoped() {
        let message = "istio.routing.v1alpha1.RouteRule";
        let descriptor = ConfigDescriptor(vec![
            schema("route-rule", "route-rules", message, false),
            schema("route-rule", "route-rules", message, false),
            schema("cluster-route-rule", "cluster-route-rules", message, true),
        ]);
        assert_eq!(
            descriptor.validate().unwrap_err().messages(),
            vec![
                "duplicate type: \"route-rule\"",
                "duplicate message type: \"istio.routing.v1alpha1.RouteRule\"",
            ]
        );
    }
}
