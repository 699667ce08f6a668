//! Shapes shared by the legacy routing API and the networking API.

use prost_types::Duration;
use serde::Deserialize;

/// A header or attribute match. The match type is a oneof: it may be unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StringMatch {
    #[serde(flatten)]
    pub match_type: Option<StringMatchType>,
}

impl StringMatch {
    pub fn exact(value: impl Into<String>) -> Self {
        Self { match_type: Some(StringMatchType::Exact(value.into())) }
    }

    pub fn prefix(value: impl Into<String>) -> Self {
        Self { match_type: Some(StringMatchType::Prefix(value.into())) }
    }

    pub fn regex(value: impl Into<String>) -> Self {
        Self { match_type: Some(StringMatchType::Regex(value.into())) }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StringMatchType {
    Exact(String),
    Prefix(String),
    Regex(String),
}

/// Cross-origin resource sharing policy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorsPolicy {
    pub allow_origin: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    #[serde(deserialize_with = "crate::domain::wire::optional_duration")]
    pub max_age: Option<Duration>,
    pub allow_credentials: Option<bool>,
}

/// HTTP redirect issued instead of forwarding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpRedirect {
    pub uri: String,
    pub authority: String,
}

/// Rewrite of the URI and/or authority before forwarding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpRewrite {
    pub uri: String,
    pub authority: String,
}

/// How an injected delay is computed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DelayType {
    #[serde(deserialize_with = "crate::domain::wire::duration")]
    FixedDelay(Duration),
    #[serde(deserialize_with = "crate::domain::wire::duration")]
    ExponentialDelay(Duration),
}

/// The error returned by an injected abort.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbortErrorType {
    GrpcStatus(String),
    Http2Error(String),
    HttpStatus(i32),
}

/// Selects a port either by name or by number. The selector is a oneof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PortSelector {
    #[serde(flatten)]
    pub port: Option<PortSelectorValue>,
}

impl PortSelector {
    pub fn number(number: u32) -> Self {
        Self { port: Some(PortSelectorValue::Number(number)) }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self { port: Some(PortSelectorValue::Name(name.into())) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortSelectorValue {
    Number(u32),
    Name(String),
}
