//! Serde adapters for proto3 well-known types.
//!
//! `prost_types::Duration` and `prost_types::Timestamp` do not implement serde
//! traits; these helpers read them from their canonical JSON strings.

use prost_types::{Duration, Timestamp};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Deserialize a required proto3 JSON duration (`"1.5s"`).
pub fn duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<Duration>()
        .map_err(|e| D::Error::custom(format!("invalid duration {:?}: {}", raw, e)))
}

/// Deserialize an optional proto3 JSON duration.
pub fn optional_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            raw.parse::<Duration>()
                .map_err(|e| D::Error::custom(format!("invalid duration {:?}: {}", raw, e)))
        })
        .transpose()
}

/// Deserialize a required RFC 3339 timestamp.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<Timestamp>()
        .map_err(|e| D::Error::custom(format!("invalid timestamp {:?}: {}", raw, e)))
}

/// Build a wire duration from milliseconds. Handy for building shapes in code.
pub fn millis(ms: i64) -> Duration {
    Duration {
        seconds: ms / 1_000,
        nanos: ((ms % 1_000) * 1_000_000) as i32,
    }
}

/// Build a wire duration from whole seconds.
pub fn seconds(secs: i64) -> Duration {
    Duration { seconds: secs, nanos: 0 }
}
