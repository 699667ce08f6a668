//! Hostnames with wildcard matching.

use serde::Deserialize;
use std::fmt;

/// A fully qualified or wildcarded hostname (`*.example.com`, `*`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct Hostname(String);

impl Hostname {
    pub fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether two hostnames overlap.
    ///
    /// Wildcards match any suffix: `*.foo.com` matches `bar.foo.com`, and two
    /// wildcards match when one suffix contains the other (`*.foo.com`, `*.com`).
    pub fn matches(&self, other: &Hostname) -> bool {
        let (this, that) = (self.as_str(), other.as_str());
        match (this.strip_prefix('*'), that.strip_prefix('*')) {
            (Some(this_suffix), Some(that_suffix)) => {
                if this_suffix.len() < that_suffix.len() {
                    that_suffix.ends_with(this_suffix)
                } else {
                    this_suffix.ends_with(that_suffix)
                }
            }
            (Some(this_suffix), None) => that.ends_with(this_suffix),
            (None, Some(that_suffix)) => this.ends_with(that_suffix),
            (None, None) => this == that,
        }
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Hostname {
    fn from(host: &str) -> Self {
        Self(host.to_string())
    }
}

impl From<String> for Hostname {
    fn from(host: String) -> Self {
        Self(host)
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(s: &str) -> Hostname {
        Hostname::from(s)
    }

    #[test]
    fn literal_hosts_match_only_themselves() {
        assert!(host("foo.com").matches(&host("foo.com")));
        assert!(!host("foo.com").matches(&host("bar.com")));
        assert!(host("").matches(&host("")));
    }

    #[test]
    fn wildcard_matches_suffix() {
        assert!(host("*.foo.com").matches(&host("bar.foo.com")));
        assert!(host("bar.foo.com").matches(&host("*.foo.com")));
        assert!(!host("*.foo.com").matches(&host("bar.com")));
    }

    #[test]
    fn overlapping_wildcards_match() {
        assert!(host("*.foo.com").matches(&host("*.com")));
        assert!(host("*.com").matches(&host("*.foo.com")));
        assert!(host("*").matches(&host("*.foo.com")));
        assert!(!host("*.foo.com").matches(&host("*.bar.com")));
    }
}
