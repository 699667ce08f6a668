//! Role-based access control resources.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The only role kind a binding may reference.
pub const SERVICE_ROLE_KIND: &str = "ServiceRole";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceRole {
    pub rules: Vec<AccessRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccessRule {
    pub services: Vec<String>,
    pub paths: Vec<String>,
    pub methods: Vec<String>,
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Constraint {
    pub key: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceRoleBinding {
    pub subjects: Vec<Subject>,
    pub role_ref: Option<RoleRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Subject {
    pub user: String,
    pub group: String,
    pub properties: BTreeMap<String, String>,
}

impl Subject {
    pub fn user(user: impl Into<String>) -> Self {
        Self { user: user.into(), ..Default::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoleRef {
    pub kind: String,
    pub name: String,
}

impl RoleRef {
    pub fn service_role(name: impl Into<String>) -> Self {
        Self { kind: SERVICE_ROLE_KIND.to_string(), name: name.into() }
    }
}

/// Mesh-wide RBAC switch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    pub mode: RbacMode,
    pub inclusion: Option<Target>,
    pub exclusion: Option<Target>,
}

proto_enum! {
    pub enum RbacMode {
        Off => "OFF",
        On => "ON",
        OnWithInclusion => "ON_WITH_INCLUSION",
        OnWithExclusion => "ON_WITH_EXCLUSION",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Target {
    pub services: Vec<String>,
    pub namespaces: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_reads_role_ref() {
        let binding: ServiceRoleBinding = serde_yaml::from_str(
            r#"
subjects:
  - user: alice@example.com
  - properties: {source.namespace: abc}
roleRef: {kind: ServiceRole, name: product-viewer}
"#,
        )
        .unwrap();
        assert_eq!(binding.subjects[0], Subject::user("alice@example.com"));
        assert_eq!(binding.role_ref, Some(RoleRef::service_role("product-viewer")));
    }

    #[test]
    fn rbac_mode_defaults_to_off() {
        let config: RbacConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.mode, RbacMode::Off);
        let config: RbacConfig = serde_json::from_str(r#"{"mode": "ON_WITH_INCLUSION"}"#).unwrap();
        assert_eq!(config.mode, RbacMode::OnWithInclusion);
    }
}
