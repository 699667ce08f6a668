//! # Validator Dispatch
//!
//! Maps a [`ResourceKind`] tag to its validator. The typed resource travels
//! inside a [`ConfigSpec`]; handing a validator the payload of another kind
//! is a fatal shape error and nothing else is checked.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::authn::Policy;
use crate::domain::mesh::{MeshConfig, ProxyConfig};
use crate::domain::mixer::{Attributes, HttpApiSpec, HttpApiSpecBinding, QuotaSpec, QuotaSpecBinding};
use crate::domain::networking::{DestinationRule, Gateway, ServiceEntry, VirtualService};
use crate::domain::rbac::{RbacConfig, ServiceRole, ServiceRoleBinding};
use crate::domain::routing::{DestinationPolicy, EgressRule, IngressRule, RouteRule};
use crate::errors::{MeshguardError, Result};
use crate::validation::report::{Outcome, Violation};
use crate::validation::resources;

/// Discriminator naming which schema and validator apply to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    RouteRule,
    IngressRule,
    EgressRule,
    DestinationPolicy,
    Gateway,
    VirtualService,
    DestinationRule,
    ServiceEntry,
    MeshConfig,
    ProxyConfig,
    HttpApiSpec,
    HttpApiSpecBinding,
    QuotaSpec,
    QuotaSpecBinding,
    AuthenticationPolicy,
    ServiceRole,
    ServiceRoleBinding,
    RbacConfig,
    MixerAttributes,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 19] = [
        ResourceKind::RouteRule,
        ResourceKind::IngressRule,
        ResourceKind::EgressRule,
        ResourceKind::DestinationPolicy,
        ResourceKind::Gateway,
        ResourceKind::VirtualService,
        ResourceKind::DestinationRule,
        ResourceKind::ServiceEntry,
        ResourceKind::MeshConfig,
        ResourceKind::ProxyConfig,
        ResourceKind::HttpApiSpec,
        ResourceKind::HttpApiSpecBinding,
        ResourceKind::QuotaSpec,
        ResourceKind::QuotaSpecBinding,
        ResourceKind::AuthenticationPolicy,
        ResourceKind::ServiceRole,
        ResourceKind::ServiceRoleBinding,
        ResourceKind::RbacConfig,
        ResourceKind::MixerAttributes,
    ];

    /// Kebab-case type name, as used in documents and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::RouteRule => "route-rule",
            ResourceKind::IngressRule => "ingress-rule",
            ResourceKind::EgressRule => "egress-rule",
            ResourceKind::DestinationPolicy => "destination-policy",
            ResourceKind::Gateway => "gateway",
            ResourceKind::VirtualService => "virtual-service",
            ResourceKind::DestinationRule => "destination-rule",
            ResourceKind::ServiceEntry => "service-entry",
            ResourceKind::MeshConfig => "mesh-config",
            ResourceKind::ProxyConfig => "proxy-config",
            ResourceKind::HttpApiSpec => "http-api-spec",
            ResourceKind::HttpApiSpecBinding => "http-api-spec-binding",
            ResourceKind::QuotaSpec => "quota-spec",
            ResourceKind::QuotaSpecBinding => "quota-spec-binding",
            ResourceKind::AuthenticationPolicy => "authentication-policy",
            ResourceKind::ServiceRole => "service-role",
            ResourceKind::ServiceRoleBinding => "service-role-binding",
            ResourceKind::RbacConfig => "rbac-config",
            ResourceKind::MixerAttributes => "mixer-attributes",
        }
    }

    /// CamelCase kind as it appears in a resource's `kind:` field.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResourceKind::RouteRule => "RouteRule",
            ResourceKind::IngressRule => "IngressRule",
            ResourceKind::EgressRule => "EgressRule",
            ResourceKind::DestinationPolicy => "DestinationPolicy",
            ResourceKind::Gateway => "Gateway",
            ResourceKind::VirtualService => "VirtualService",
            ResourceKind::DestinationRule => "DestinationRule",
            ResourceKind::ServiceEntry => "ServiceEntry",
            ResourceKind::MeshConfig => "MeshConfig",
            ResourceKind::ProxyConfig => "ProxyConfig",
            ResourceKind::HttpApiSpec => "HTTPAPISpec",
            ResourceKind::HttpApiSpecBinding => "HTTPAPISpecBinding",
            ResourceKind::QuotaSpec => "QuotaSpec",
            ResourceKind::QuotaSpecBinding => "QuotaSpecBinding",
            ResourceKind::AuthenticationPolicy => "Policy",
            ResourceKind::ServiceRole => "ServiceRole",
            ResourceKind::ServiceRoleBinding => "ServiceRoleBinding",
            ResourceKind::RbacConfig => "RbacConfig",
            ResourceKind::MixerAttributes => "Attributes",
        }
    }

    /// Plural resource name.
    pub fn plural(&self) -> String {
        match self {
            ResourceKind::DestinationPolicy => "destination-policies".to_string(),
            ResourceKind::AuthenticationPolicy => "authentication-policies".to_string(),
            ResourceKind::MixerAttributes => "mixer-attributes".to_string(),
            other => format!("{}s", other.as_str()),
        }
    }

    /// Fully qualified proto message name of the resource's schema.
    pub fn message_name(&self) -> &'static str {
        match self {
            ResourceKind::RouteRule => "istio.routing.v1alpha1.RouteRule",
            ResourceKind::IngressRule => "istio.routing.v1alpha1.IngressRule",
            ResourceKind::EgressRule => "istio.routing.v1alpha1.EgressRule",
            ResourceKind::DestinationPolicy => "istio.routing.v1alpha1.DestinationPolicy",
            ResourceKind::Gateway => "istio.networking.v1alpha3.Gateway",
            ResourceKind::VirtualService => "istio.networking.v1alpha3.VirtualService",
            ResourceKind::DestinationRule => "istio.networking.v1alpha3.DestinationRule",
            ResourceKind::ServiceEntry => "istio.networking.v1alpha3.ServiceEntry",
            ResourceKind::MeshConfig => "istio.mesh.v1alpha1.MeshConfig",
            ResourceKind::ProxyConfig => "istio.mesh.v1alpha1.ProxyConfig",
            ResourceKind::HttpApiSpec => "istio.mixer.v1.config.client.HTTPAPISpec",
            ResourceKind::HttpApiSpecBinding => "istio.mixer.v1.config.client.HTTPAPISpecBinding",
            ResourceKind::QuotaSpec => "istio.mixer.v1.config.client.QuotaSpec",
            ResourceKind::QuotaSpecBinding => "istio.mixer.v1.config.client.QuotaSpecBinding",
            ResourceKind::AuthenticationPolicy => "istio.authentication.v1alpha1.Policy",
            ResourceKind::ServiceRole => "istio.rbac.v1alpha1.ServiceRole",
            ResourceKind::ServiceRoleBinding => "istio.rbac.v1alpha1.ServiceRoleBinding",
            ResourceKind::RbacConfig => "istio.rbac.v1alpha1.RbacConfig",
            ResourceKind::MixerAttributes => "istio.mixer.v1.Attributes",
        }
    }

    /// Mesh-wide singletons live outside any namespace.
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(
            self,
            ResourceKind::MeshConfig | ResourceKind::ProxyConfig | ResourceKind::RbacConfig
        )
    }

    /// Human-readable name used in shape errors.
    fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::RouteRule => "routing rule",
            ResourceKind::IngressRule => "ingress rule",
            ResourceKind::EgressRule => "egress rule",
            ResourceKind::DestinationPolicy => "destination policy",
            ResourceKind::Gateway => "gateway",
            ResourceKind::VirtualService => "virtual service",
            ResourceKind::DestinationRule => "destination rule",
            ResourceKind::ServiceEntry => "service entry",
            ResourceKind::MeshConfig => "mesh config",
            ResourceKind::ProxyConfig => "proxy config",
            ResourceKind::HttpApiSpec => "HTTPAPISpec",
            ResourceKind::HttpApiSpecBinding => "HTTPAPISpecBinding",
            ResourceKind::QuotaSpec => "QuotaSpec",
            ResourceKind::QuotaSpecBinding => "QuotaSpecBinding",
            ResourceKind::AuthenticationPolicy => "AuthenticationPolicy",
            ResourceKind::ServiceRole => "ServiceRole",
            ResourceKind::ServiceRoleBinding => "ServiceRoleBinding",
            ResourceKind::RbacConfig => "RbacConfig",
            ResourceKind::MixerAttributes => "attributes",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = MeshguardError;

    /// Accepts the kebab-case type name or the CamelCase kind, ignoring case
    /// for the latter.
    fn from_str(s: &str) -> Result<Self> {
        ResourceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s || kind.kind_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MeshguardError::unknown_kind(s))
    }
}

/// A typed resource tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSpec {
    RouteRule(RouteRule),
    IngressRule(IngressRule),
    EgressRule(EgressRule),
    DestinationPolicy(DestinationPolicy),
    Gateway(Gateway),
    VirtualService(VirtualService),
    DestinationRule(DestinationRule),
    ServiceEntry(ServiceEntry),
    MeshConfig(MeshConfig),
    ProxyConfig(ProxyConfig),
    HttpApiSpec(HttpApiSpec),
    HttpApiSpecBinding(HttpApiSpecBinding),
    QuotaSpec(QuotaSpec),
    QuotaSpecBinding(QuotaSpecBinding),
    AuthenticationPolicy(Policy),
    ServiceRole(ServiceRole),
    ServiceRoleBinding(ServiceRoleBinding),
    RbacConfig(RbacConfig),
    MixerAttributes(Attributes),
}

impl ConfigSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ConfigSpec::RouteRule(_) => ResourceKind::RouteRule,
            ConfigSpec::IngressRule(_) => ResourceKind::IngressRule,
            ConfigSpec::EgressRule(_) => ResourceKind::EgressRule,
            ConfigSpec::DestinationPolicy(_) => ResourceKind::DestinationPolicy,
            ConfigSpec::Gateway(_) => ResourceKind::Gateway,
            ConfigSpec::VirtualService(_) => ResourceKind::VirtualService,
            ConfigSpec::DestinationRule(_) => ResourceKind::DestinationRule,
            ConfigSpec::ServiceEntry(_) => ResourceKind::ServiceEntry,
            ConfigSpec::MeshConfig(_) => ResourceKind::MeshConfig,
            ConfigSpec::ProxyConfig(_) => ResourceKind::ProxyConfig,
            ConfigSpec::HttpApiSpec(_) => ResourceKind::HttpApiSpec,
            ConfigSpec::HttpApiSpecBinding(_) => ResourceKind::HttpApiSpecBinding,
            ConfigSpec::QuotaSpec(_) => ResourceKind::QuotaSpec,
            ConfigSpec::QuotaSpecBinding(_) => ResourceKind::QuotaSpecBinding,
            ConfigSpec::AuthenticationPolicy(_) => ResourceKind::AuthenticationPolicy,
            ConfigSpec::ServiceRole(_) => ResourceKind::ServiceRole,
            ConfigSpec::ServiceRoleBinding(_) => ResourceKind::ServiceRoleBinding,
            ConfigSpec::RbacConfig(_) => ResourceKind::RbacConfig,
            ConfigSpec::MixerAttributes(_) => ResourceKind::MixerAttributes,
        }
    }

    /// Decode an untyped document body into the shape registered for `kind`.
    pub fn from_value(kind: ResourceKind, value: serde_json::Value) -> Result<Self> {
        fn decode<T: serde::de::DeserializeOwned>(
            kind: ResourceKind,
            value: serde_json::Value,
        ) -> Result<T> {
            serde_json::from_value(value)
                .map_err(|e| MeshguardError::from(e).context(format!("decoding {} spec", kind)))
        }

        Ok(match kind {
            ResourceKind::RouteRule => ConfigSpec::RouteRule(decode(kind, value)?),
            ResourceKind::IngressRule => ConfigSpec::IngressRule(decode(kind, value)?),
            ResourceKind::EgressRule => ConfigSpec::EgressRule(decode(kind, value)?),
            ResourceKind::DestinationPolicy => ConfigSpec::DestinationPolicy(decode(kind, value)?),
            ResourceKind::Gateway => ConfigSpec::Gateway(decode(kind, value)?),
            ResourceKind::VirtualService => ConfigSpec::VirtualService(decode(kind, value)?),
            ResourceKind::DestinationRule => ConfigSpec::DestinationRule(decode(kind, value)?),
            ResourceKind::ServiceEntry => ConfigSpec::ServiceEntry(decode(kind, value)?),
            ResourceKind::MeshConfig => ConfigSpec::MeshConfig(decode(kind, value)?),
            ResourceKind::ProxyConfig => ConfigSpec::ProxyConfig(decode(kind, value)?),
            ResourceKind::HttpApiSpec => ConfigSpec::HttpApiSpec(decode(kind, value)?),
            ResourceKind::HttpApiSpecBinding => ConfigSpec::HttpApiSpecBinding(decode(kind, value)?),
            ResourceKind::QuotaSpec => ConfigSpec::QuotaSpec(decode(kind, value)?),
            ResourceKind::QuotaSpecBinding => ConfigSpec::QuotaSpecBinding(decode(kind, value)?),
            ResourceKind::AuthenticationPolicy => {
                ConfigSpec::AuthenticationPolicy(decode(kind, value)?)
            }
            ResourceKind::ServiceRole => ConfigSpec::ServiceRole(decode(kind, value)?),
            ResourceKind::ServiceRoleBinding => ConfigSpec::ServiceRoleBinding(decode(kind, value)?),
            ResourceKind::RbacConfig => ConfigSpec::RbacConfig(decode(kind, value)?),
            ResourceKind::MixerAttributes => ConfigSpec::MixerAttributes(decode(kind, value)?),
        })
    }
}

/// Signature every registered validator shares: name, namespace, resource.
pub type ValidateFn = fn(&str, &str, &ConfigSpec) -> Outcome;

/// Define a dispatch wrapper that unpacks one `ConfigSpec` variant and fails
/// with a shape error on any other.
macro_rules! validator {
    ($fn_name:ident, $kind:ident, |$name:ident, $namespace:ident, $spec:ident| $body:expr) => {
        fn $fn_name($name: &str, $namespace: &str, spec: &ConfigSpec) -> Outcome {
            match spec {
                ConfigSpec::$kind($spec) => $body,
                _ => Violation::shape(format!(
                    "cannot cast to {}",
                    ResourceKind::$kind.display_name()
                ))
                .fail(),
            }
        }
    };
}

validator!(route_rule, RouteRule, |_name, _namespace, rule| resources::validate_route_rule(rule));
validator!(ingress_rule, IngressRule, |_name, _namespace, rule| resources::validate_ingress_rule(rule));
validator!(egress_rule, EgressRule, |_name, _namespace, rule| resources::validate_egress_rule(rule));
validator!(destination_policy, DestinationPolicy, |_name, _namespace, policy| {
    resources::validate_destination_policy(policy)
});
validator!(gateway, Gateway, |_name, _namespace, gateway| resources::validate_gateway(gateway));
validator!(virtual_service, VirtualService, |_name, _namespace, service| {
    resources::validate_virtual_service(service)
});
validator!(destination_rule, DestinationRule, |_name, _namespace, rule| {
    resources::validate_destination_rule(rule)
});
validator!(service_entry, ServiceEntry, |_name, _namespace, entry| {
    resources::validate_service_entry(entry)
});
validator!(mesh_config, MeshConfig, |_name, _namespace, mesh| resources::validate_mesh_config(mesh));
validator!(proxy_config, ProxyConfig, |_name, _namespace, config| {
    resources::validate_proxy_config(config)
});
validator!(http_api_spec, HttpApiSpec, |_name, _namespace, spec| resources::validate_http_api_spec(spec));
validator!(http_api_spec_binding, HttpApiSpecBinding, |_name, _namespace, binding| {
    resources::validate_http_api_spec_binding(binding)
});
validator!(quota_spec, QuotaSpec, |_name, _namespace, spec| resources::validate_quota_spec(spec));
validator!(quota_spec_binding, QuotaSpecBinding, |_name, _namespace, binding| {
    resources::validate_quota_spec_binding(binding)
});
validator!(authentication_policy, AuthenticationPolicy, |name, namespace, policy| {
    resources::validate_authentication_policy(name, namespace, policy)
});
validator!(service_role, ServiceRole, |_name, _namespace, role| resources::validate_service_role(role));
validator!(service_role_binding, ServiceRoleBinding, |_name, _namespace, binding| {
    resources::validate_service_role_binding(binding)
});
validator!(rbac_config, RbacConfig, |_name, _namespace, config| resources::validate_rbac_config(config));
validator!(mixer_attributes, MixerAttributes, |_name, _namespace, bag| {
    resources::validate_mixer_attributes(bag)
});

static VALIDATORS: Lazy<HashMap<ResourceKind, ValidateFn>> = Lazy::new(|| {
    let entries: [(ResourceKind, ValidateFn); 19] = [
        (ResourceKind::RouteRule, route_rule),
        (ResourceKind::IngressRule, ingress_rule),
        (ResourceKind::EgressRule, egress_rule),
        (ResourceKind::DestinationPolicy, destination_policy),
        (ResourceKind::Gateway, gateway),
        (ResourceKind::VirtualService, virtual_service),
        (ResourceKind::DestinationRule, destination_rule),
        (ResourceKind::ServiceEntry, service_entry),
        (ResourceKind::MeshConfig, mesh_config),
        (ResourceKind::ProxyConfig, proxy_config),
        (ResourceKind::HttpApiSpec, http_api_spec),
        (ResourceKind::HttpApiSpecBinding, http_api_spec_binding),
        (ResourceKind::QuotaSpec, quota_spec),
        (ResourceKind::QuotaSpecBinding, quota_spec_binding),
        (ResourceKind::AuthenticationPolicy, authentication_policy),
        (ResourceKind::ServiceRole, service_role),
        (ResourceKind::ServiceRoleBinding, service_role_binding),
        (ResourceKind::RbacConfig, rbac_config),
        (ResourceKind::MixerAttributes, mixer_attributes),
    ];
    entries.into_iter().collect()
});

/// The validator registered for `kind`.
pub fn validator_for(kind: ResourceKind) -> Option<ValidateFn> {
    VALIDATORS.get(&kind).copied()
}

/// Validate `spec` as a resource of `kind`.
///
/// A payload of a different kind fails with a single shape violation.
#[instrument(level = "debug", name = "validate_config", skip(kind, spec), fields(kind = %kind))]
pub fn validate_config(kind: ResourceKind, name: &str, namespace: &str, spec: &ConfigSpec) -> Outcome {
    let outcome = match validator_for(kind) {
        Some(validate) => validate(name, namespace, spec),
        None => Violation::shape(format!("no validator registered for {}", kind)).fail(),
    };

    match &outcome {
        Ok(()) => debug!("configuration valid"),
        Err(violations) => debug!(violations = violations.len(), "configuration rejected"),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn every_kind_has_a_validator() {
        for kind in ResourceKind::ALL {
            assert!(validator_for(kind).is_some(), "{} has no validator", kind);
        }
        assert_eq!(VALIDATORS.len(), ResourceKind::ALL.len());
    }

    #[test]
    fn kinds_parse_from_type_and_kind_names() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
            assert_eq!(kind.kind_name().parse::<ResourceKind>().unwrap(), kind);
        }
        assert_eq!("HttpApiSpec".parse::<ResourceKind>().unwrap(), ResourceKind::HttpApiSpec);
        assert!(matches!(
            "widget".parse::<ResourceKind>(),
            Err(MeshguardError::UnknownKind { .. })
        ));
    }

    #[test]
    fn plurals() {
        assert_eq!(ResourceKind::Gateway.plural(), "gateways");
        assert_eq!(ResourceKind::DestinationPolicy.plural(), "destination-policies");
        assert_eq!(ResourceKind::ServiceRoleBinding.plural(), "service-role-bindings");
    }

    #[test]
    fn wrong_payload_is_a_shape_error() {
        let spec = ConfigSpec::Gateway(Gateway::default());
        let errors = validate_config(ResourceKind::RouteRule, "reviews", "default", &spec).unwrap_err();
        assert_eq!(errors.messages(), vec!["cannot cast to routing rule"]);
        assert_eq!(errors.as_slice()[0].kind, crate::validation::report::ViolationKind::Shape);

        let spec = ConfigSpec::RbacConfig(RbacConfig::default());
        assert_eq!(
            validate_config(ResourceKind::ServiceRole, "viewer", "default", &spec).unwrap_err().messages(),
            vec!["cannot cast to ServiceRole"]
        );
    }

    #[test]
    fn decoded_documents_dispatch_by_kind() {
        let value = json!({
            "servers": [
                {"port": {"number": 80, "protocol": "HTTP", "name": "http"}, "hosts": ["*.example.com"]},
                {"port": {"number": 8080, "protocol": "HTTP", "name": "http"}, "hosts": ["*.example.com"]}
            ]
        });
        let spec = ConfigSpec::from_value(ResourceKind::Gateway, value).unwrap();
        assert_eq!(spec.kind(), ResourceKind::Gateway);
        assert_eq!(
            validate_config(ResourceKind::Gateway, "ingress", "default", &spec).unwrap_err().messages(),
            vec!["port names in servers must be unique: duplicate name http"]
        );

        let bad = ConfigSpec::from_value(ResourceKind::Gateway, json!({"servers": "nope"}));
        assert!(matches!(bad, Err(MeshguardError::Json { .. })));
    }

    #[test]
    fn name_and_namespace_reach_the_validator() {
        let spec = ConfigSpec::AuthenticationPolicy(Policy::default());
        assert!(validate_config(ResourceKind::AuthenticationPolicy, "default", "", &spec).is_ok());
        assert!(validate_config(ResourceKind::AuthenticationPolicy, "custom", "", &spec).is_err());
    }

    #[traced_test]
    #[test]
    fn dispatch_logs_the_outcome() {
        let spec = ConfigSpec::RbacConfig(RbacConfig::default());
        assert!(validate_config(ResourceKind::RbacConfig, "default", "", &spec).is_ok());
        assert!(logs_contain("configuration valid"));

        let spec = ConfigSpec::Gateway(Gateway::default());
        assert!(validate_config(ResourceKind::Gateway, "empty", "default", &spec).is_err());
        assert!(logs_contain("configuration rejected"));
        assert!(logs_contain("kind=gateway"));
    }
}
