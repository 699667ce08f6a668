//! Attribute bags, HTTP API specs, quota specs and their bindings.

use crate::domain::common::StringMatchType;
use crate::domain::mixer::{
    ApiKeyLocation, ApiPattern, AttributeValueKind, Attributes, HttpApiSpec, HttpApiSpecBinding,
    QuotaSpec, QuotaSpecBinding, SpecReference,
};
use crate::domain::routing::IstioService;
use crate::validation::primitives::{is_dns1123_label, validate_duration, validate_timestamp};
use crate::validation::report::{ErrorCollector, Outcome, Violation};

use super::route_rule::validate_istio_service;

/// Validate an attribute bag.
pub fn validate_mixer_attributes(bag: &Attributes) -> Outcome {
    if bag.attributes.is_empty() {
        return Violation::required("list of attributes is nil/empty").fail();
    }

    let mut errors = ErrorCollector::new();
    for (name, value) in &bag.attributes {
        match &value.value {
            Some(AttributeValueKind::StringValue(s)) if s.is_empty() => {
                errors.push(Violation::required(format!(
                    "string attribute for {:?} should not be empty",
                    name
                )));
            }
            Some(AttributeValueKind::BytesValue(bytes)) if bytes.is_empty() => {
                errors.push(Violation::required(format!(
                    "bytes attribute for {:?} should not be empty",
                    name
                )));
            }
            Some(AttributeValueKind::DurationValue(duration)) => {
                errors.check(validate_duration(duration));
            }
            Some(AttributeValueKind::TimestampValue(timestamp)) => {
                errors.check(validate_timestamp(timestamp));
            }
            Some(AttributeValueKind::StringMapValue(map)) if map.entries.is_none() => {
                errors.push(Violation::required(format!(
                    "stringmap attribute for {:?} should not be nil",
                    name
                )));
            }
            Some(_) => {}
            None => errors.push(Violation::required(format!(
                "attribute {:?} must set a value",
                name
            ))),
        }
    }
    errors.finish()
}

pub fn validate_http_api_spec(spec: &HttpApiSpec) -> Outcome {
    let mut errors = ErrorCollector::new();

    // the top-level attribute bag is optional
    if let Some(attributes) = &spec.attributes {
        errors.check(validate_mixer_attributes(attributes));
    }

    if spec.patterns.is_empty() {
        errors.push(Violation::required("at least one pattern must be specified"));
    }
    for pattern in &spec.patterns {
        if let Some(attributes) = &pattern.attributes {
            errors.check(validate_mixer_attributes(attributes));
        }
        if pattern.http_method.is_empty() {
            errors.push(Violation::required("http_method cannot be empty"));
        }
        match &pattern.pattern {
            Some(ApiPattern::UriTemplate(template)) if template.is_empty() => {
                errors.push(Violation::required("uri_template cannot be empty"));
            }
            Some(ApiPattern::Regex(regex)) if regex.is_empty() => {
                errors.push(Violation::required("regex cannot be empty"));
            }
            Some(_) => {}
            None => errors.push(Violation::required(
                "pattern must set uri_template or regex",
            )),
        }
    }

    for key in &spec.api_keys {
        match &key.key {
            Some(ApiKeyLocation::Query(query)) if query.is_empty() => {
                errors.push(Violation::required("query cannot be empty"));
            }
            Some(ApiKeyLocation::Header(header)) if header.is_empty() => {
                errors.push(Violation::required("header cannot be empty"));
            }
            Some(ApiKeyLocation::Cookie(cookie)) if cookie.is_empty() => {
                errors.push(Violation::required("cookie cannot be empty"));
            }
            Some(_) => {}
            None => errors.push(Violation::required("api key must set query, header or cookie")),
        }
    }

    errors.finish()
}

fn validate_binding(services: &[IstioService], specs: &[SpecReference], reference: &str) -> Outcome {
    let mut errors = ErrorCollector::new();
    if services.is_empty() {
        errors.push(Violation::required("at least one service must be specified"));
    }
    for service in services {
        errors.check(validate_istio_service(service));
    }
    if specs.is_empty() {
        errors.push(Violation::required("at least one spec must be specified"));
    }
    for spec in specs {
        if spec.name.is_empty() {
            errors.push(Violation::required(format!("name is mandatory for {}", reference)));
        }
        if !spec.namespace.is_empty() && !is_dns1123_label(&spec.namespace) {
            errors.push(Violation::format(format!(
                "namespace {:?} must be a valid label",
                spec.namespace
            )));
        }
    }
    errors.finish()
}

pub fn validate_http_api_spec_binding(binding: &HttpApiSpecBinding) -> Outcome {
    validate_binding(&binding.services, &binding.api_specs, "HTTPAPISpecReference")
}

pub fn validate_quota_spec_binding(binding: &QuotaSpecBinding) -> Outcome {
    validate_binding(&binding.services, &binding.quota_specs, "QuotaSpecReference")
}

pub fn validate_quota_spec(spec: &QuotaSpec) -> Outcome {
    let mut errors = ErrorCollector::new();
    if spec.rules.is_empty() {
        errors.push(Violation::required("a least one rule must be specified"));
    }
    for rule in &spec.rules {
        for attribute_match in &rule.match_ {
            for (name, clause) in &attribute_match.clause {
                let empty = match &clause.match_type {
                    Some(StringMatchType::Exact(v)) if v.is_empty() => Some("Exact"),
                    Some(StringMatchType::Prefix(v)) if v.is_empty() => Some("Prefix"),
                    Some(StringMatchType::Regex(v)) if v.is_empty() => Some("Regex"),
                    Some(_) => None,
                    None => {
                        errors.push(Violation::format(format!(
                            "StringMatch for attribute {:?} must set exact, prefix or regex",
                            name
                        )));
                        None
                    }
                };
                if let Some(variant) = empty {
                    errors.push(Violation::required(format!(
                        "StringMatch_{} for attribute {:?} cannot be empty",
                        variant, name
                    )));
                }
            }
        }

        if rule.quotas.is_empty() {
            errors.push(Violation::required("a least one quota must be specified"));
        }
        for quota in &rule.quotas {
            if quota.quota.is_empty() {
                errors.push(Violation::required("quota name cannot be empty"));
            }
            if quota.charge <= 0 {
                errors.push(Violation::range("quota charge amount must be positive"));
            }
        }
    }
    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mixer::{
        ApiKey, AttributeMatch, AttributeValue, HttpApiSpecPattern, Quota, QuotaRule, StringMap,
    };
    use crate::domain::wire::millis;
    use crate::domain::StringMatch;
    use prost_types::Timestamp;

    fn bag(entries: Vec<(&str, AttributeValue)>) -> Attributes {
        Attributes {
            attributes: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    fn pattern(method: &str, template: &str) -> HttpApiSpecPattern {
        HttpApiSpecPattern {
            attributes: None,
            http_method: method.into(),
            pattern: Some(ApiPattern::UriTemplate(template.into())),
        }
    }

    #[test]
    fn attribute_values() {
        let valid = bag(vec![
            ("api.service", AttributeValue::new(AttributeValueKind::StringValue("reviews".into()))),
            ("request.size", AttributeValue::new(AttributeValueKind::Int64Value(42))),
            ("response.duration", AttributeValue::new(AttributeValueKind::DurationValue(millis(250)))),
        ]);
        assert!(validate_mixer_attributes(&valid).is_ok());

        assert_eq!(
            validate_mixer_attributes(&Attributes::default()).unwrap_err().messages(),
            vec!["list of attributes is nil/empty"]
        );

        let invalid = bag(vec![
            ("a", AttributeValue::new(AttributeValueKind::StringValue(String::new()))),
            ("b", AttributeValue::new(AttributeValueKind::BytesValue(String::new()))),
            ("c", AttributeValue::new(AttributeValueKind::StringMapValue(StringMap { entries: None }))),
            ("d", AttributeValue::new(AttributeValueKind::TimestampValue(Timestamp { seconds: 253_402_300_800, nanos: 0 }))),
            ("e", AttributeValue::default()),
        ]);
        let errors = validate_mixer_attributes(&invalid).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains("string attribute for \"a\" should not be empty"));
        assert!(errors.contains("stringmap attribute for \"c\" should not be nil"));
        assert!(errors.contains("after 10000-01-01"));
        assert!(errors.contains("attribute \"e\" must set a value"));
    }

    #[test]
    fn http_api_spec_patterns_and_keys() {
        let spec = HttpApiSpec {
            patterns: vec![pattern("GET", "/books/{id}")],
            api_keys: vec![ApiKey { key: Some(ApiKeyLocation::Query("key".into())) }],
            ..Default::default()
        };
        assert!(validate_http_api_spec(&spec).is_ok());

        let spec = HttpApiSpec {
            patterns: vec![
                pattern("", ""),
                HttpApiSpecPattern {
                    attributes: Some(Attributes::default()),
                    http_method: "POST".into(),
                    pattern: Some(ApiPattern::Regex(String::new())),
                },
            ],
            api_keys: vec![
                ApiKey { key: Some(ApiKeyLocation::Cookie(String::new())) },
                ApiKey::default(),
            ],
            ..Default::default()
        };
        assert_eq!(
            validate_http_api_spec(&spec).unwrap_err().messages(),
            vec![
                "http_method cannot be empty",
                "uri_template cannot be empty",
                "list of attributes is nil/empty",
                "regex cannot be empty",
                "cookie cannot be empty",
                "api key must set query, header or cookie",
            ]
        );

        assert_eq!(
            validate_http_api_spec(&HttpApiSpec::default()).unwrap_err().messages(),
            vec!["at least one pattern must be specified"]
        );
    }

    #[test]
    fn bindings() {
        let binding = HttpApiSpecBinding {
            services: vec![IstioService::named("bookinfo")],
            api_specs: vec![SpecReference::new("petstore", "default")],
        };
        assert!(validate_http_api_spec_binding(&binding).is_ok());

        assert_eq!(
            validate_quota_spec_binding(&QuotaSpecBinding::default()).unwrap_err().messages(),
            vec!["at least one service must be specified", "at least one spec must be specified"]
        );

        let binding = QuotaSpecBinding {
            services: vec![IstioService::default()],
            quota_specs: vec![SpecReference::new("", "Bad_Ns")],
        };
        assert_eq!(
            validate_quota_spec_binding(&binding).unwrap_err().messages(),
            vec![
                "name or service is mandatory for a service reference",
                "name is mandatory for QuotaSpecReference",
                "namespace \"Bad_Ns\" must be a valid label",
            ]
        );
    }

    #[test]
    fn quota_specs() {
        let spec = QuotaSpec {
            rules: vec![QuotaRule {
                match_: vec![AttributeMatch {
                    clause: [("request.path".to_string(), StringMatch::prefix("/api"))].into_iter().collect(),
                }],
                quotas: vec![Quota::new("requestcount", 1)],
            }],
        };
        assert!(validate_quota_spec(&spec).is_ok());

        let spec = QuotaSpec {
            rules: vec![
                QuotaRule {
                    match_: vec![AttributeMatch {
                        clause: [
                            ("a".to_string(), StringMatch::exact("")),
                            ("b".to_string(), StringMatch::default()),
                        ]
                        .into_iter()
                        .collect(),
                    }],
                    quotas: vec![Quota::new("", 0)],
                },
                QuotaRule::default(),
            ],
        };
        assert_eq!(
            validate_quota_spec(&spec).unwrap_err().messages(),
            vec![
                "StringMatch_Exact for attribute \"a\" cannot be empty",
                "StringMatch for attribute \"b\" must set exact, prefix or regex",
                "quota name cannot be empty",
                "quota charge amount must be positive",
                "a least one quota must be specified",
            ]
        );
        assert!(validate_quota_spec(&QuotaSpec::default()).is_err());
    }
}
