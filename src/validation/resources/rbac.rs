use crate::domain::rbac::{RbacConfig, RbacMode, ServiceRole, ServiceRoleBinding, SERVICE_ROLE_KIND};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

pub fn validate_service_role(role: &ServiceRole) -> Outcome {
    let mut errors = ErrorCollector::new();
    if role.rules.is_empty() {
        errors.push(Violation::required("at least 1 rule must be specified"));
    }
    for (i, rule) in role.rules.iter().enumerate() {
        if rule.services.is_empty() {
            errors.push(Violation::required(format!(
                "at least 1 service must be specified for rule {}",
                i
            )));
        }
        if rule.methods.is_empty() {
            errors.push(Violation::required(format!(
                "at least 1 method must be specified for rule {}",
                i
            )));
        }
        for (j, constraint) in rule.constraints.iter().enumerate() {
            if constraint.key.is_empty() {
                errors.push(Violation::required(format!(
                    "key cannot be empty for constraint {} in rule {}",
                    j, i
                )));
            }
            if constraint.values.is_empty() {
                errors.push(Violation::required(format!(
                    "at least 1 value must be specified for constraint {} in rule {}",
                    j, i
                )));
            }
        }
    }
    errors.finish()
}

pub fn validate_service_role_binding(binding: &ServiceRoleBinding) -> Outcome {
    let mut errors = ErrorCollector::new();
    if binding.subjects.is_empty() {
        errors.push(Violation::required("at least 1 subject must be specified"));
    }
    for (i, subject) in binding.subjects.iter().enumerate() {
        if subject.user.is_empty() && subject.group.is_empty() && subject.properties.is_empty() {
            errors.push(Violation::required(format!(
                "at least 1 of user, group or properties must be specified for subject {}",
                i
            )));
        }
    }

    match &binding.role_ref {
        None => errors.push(Violation::required("roleRef must be specified")),
        Some(role_ref) => {
            if role_ref.kind != SERVICE_ROLE_KIND {
                errors.push(Violation::unsupported(format!(
                    "kind set to {:?}, currently the only supported value is {:?}",
                    role_ref.kind, SERVICE_ROLE_KIND
                )));
            }
            if role_ref.name.is_empty() {
                errors.push(Violation::required("name cannot be empty"));
            }
        }
    }
    errors.finish()
}

/// Only switching RBAC fully on or off is supported.
pub fn validate_rbac_config(config: &RbacConfig) -> Outcome {
    match &config.mode {
        RbacMode::Off | RbacMode::On => Ok(()),
        RbacMode::OnWithInclusion | RbacMode::OnWithExclusion => {
            Violation::unsupported("rbac mode not implemented, currently only supports ON/OFF").fail()
        }
        RbacMode::Unrecognized(mode) => {
            Violation::format(format!("unrecognized rbac mode {:?}", mode)).fail()
        }
    }
}
