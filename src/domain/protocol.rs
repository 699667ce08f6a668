//! Protocol name table.
//!
//! Protocol names are resolved case-insensitively against an immutable,
//! process-wide table built on first use.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Application protocol carried on a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Protocol {
    Grpc,
    Http,
    Http2,
    Https,
    Tcp,
    Udp,
    Mongo,
    Redis,
    /// Any name missing from the protocol table.
    Unsupported,
}

static PROTOCOLS: Lazy<HashMap<&'static str, Protocol>> = Lazy::new(|| {
    HashMap::from([
        ("grpc", Protocol::Grpc),
        ("http", Protocol::Http),
        ("http2", Protocol::Http2),
        ("https", Protocol::Https),
        ("tcp", Protocol::Tcp),
        ("udp", Protocol::Udp),
        ("mongo", Protocol::Mongo),
        ("redis", Protocol::Redis),
    ])
});

/// Protocols an egress rule may declare.
pub const EGRESS_SUPPORTED_PROTOCOLS: [Protocol; 6] = [
    Protocol::Http,
    Protocol::Http2,
    Protocol::Grpc,
    Protocol::Https,
    Protocol::Tcp,
    Protocol::Mongo,
];

/// Protocols usable with a CIDR egress destination.
pub const EGRESS_SUPPORTED_TCP_PROTOCOLS: [Protocol; 2] = [Protocol::Tcp, Protocol::Mongo];

/// Protocols accepted on a gateway server port.
pub const GATEWAY_PROTOCOLS: &str = "HTTP, HTTP2, GRPC, HTTPS, MONGO, REDIS, TCP";

impl Protocol {
    /// Resolve a protocol name; unknown names map to [`Protocol::Unsupported`].
    pub fn parse(name: &str) -> Self {
        PROTOCOLS
            .get(name.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(Protocol::Unsupported)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Grpc => "GRPC",
            Protocol::Http => "HTTP",
            Protocol::Http2 => "HTTP2",
            Protocol::Https => "HTTPS",
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Mongo => "Mongo",
            Protocol::Redis => "Redis",
            Protocol::Unsupported => "UnsupportedProtocol",
        }
    }

    pub fn is_supported(&self) -> bool {
        *self != Protocol::Unsupported
    }

    pub fn is_egress_supported(&self) -> bool {
        EGRESS_SUPPORTED_PROTOCOLS.contains(self)
    }

    pub fn is_egress_supported_tcp(&self) -> bool {
        EGRESS_SUPPORTED_TCP_PROTOCOLS.contains(self)
    }
}

impl From<String> for Protocol {
    fn from(name: String) -> Self {
        Protocol::parse(&name)
    }
}

impl From<&str> for Protocol {
    fn from(name: &str) -> Self {
        Protocol::parse(name)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a protocol list for messages, e.g. `HTTP,HTTP2,GRPC`.
pub fn protocol_list(protocols: &[Protocol]) -> String {
    protocols.iter().map(Protocol::as_str).collect::<Vec<_>>().join(",")
}
