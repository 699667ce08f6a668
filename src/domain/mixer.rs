//! Policy/telemetry client resources: attribute bags, HTTP API specs, quota
//! specs and their bindings to services.

use prost_types::{Duration, Timestamp};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::common::StringMatch;
use super::routing::IstioService;

/// A bag of named attribute values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// One attribute value. The value is a oneof and may be unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AttributeValue {
    #[serde(flatten)]
    pub value: Option<AttributeValueKind>,
}

impl AttributeValue {
    pub fn new(value: AttributeValueKind) -> Self {
        Self { value: Some(value) }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeValueKind {
    StringValue(String),
    Int64Value(i64),
    DoubleValue(f64),
    BoolValue(bool),
    /// Base64 text, as in proto3 JSON.
    BytesValue(String),
    #[serde(deserialize_with = "crate::domain::wire::timestamp")]
    TimestampValue(Timestamp),
    #[serde(deserialize_with = "crate::domain::wire::duration")]
    DurationValue(Duration),
    StringMapValue(StringMap),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StringMap {
    pub entries: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpApiSpec {
    pub attributes: Option<Attributes>,
    pub patterns: Vec<HttpApiSpecPattern>,
    pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpApiSpecPattern {
    pub attributes: Option<Attributes>,
    pub http_method: String,
    #[serde(flatten)]
    pub pattern: Option<ApiPattern>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiPattern {
    UriTemplate(String),
    Regex(String),
}

/// Where an API key is read from. The location is a oneof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiKey {
    #[serde(flatten)]
    pub key: Option<ApiKeyLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiKeyLocation {
    Query(String),
    Header(String),
    Cookie(String),
}

/// Reference to an HTTP API spec or quota spec by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecReference {
    pub name: String,
    pub namespace: String,
}

impl SpecReference {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self { name: name.into(), namespace: namespace.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpApiSpecBinding {
    pub services: Vec<IstioService>,
    pub api_specs: Vec<SpecReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuotaSpec {
    pub rules: Vec<QuotaRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuotaRule {
    #[serde(rename = "match")]
    pub match_: Vec<AttributeMatch>,
    pub quotas: Vec<Quota>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AttributeMatch {
    pub clause: BTreeMap<String, StringMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Quota {
    pub quota: String,
    pub charge: i64,
}

impl Quota {
    pub fn new(quota: impl Into<String>, charge: i64) -> Self {
        Self { quota: quota.into(), charge }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuotaSpecBinding {
    pub services: Vec<IstioService>,
    pub quota_specs: Vec<SpecReference>,
}
