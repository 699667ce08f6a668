//! Authentication policies.

use serde::Deserialize;

use super::common::PortSelector;

/// Reserved name of the namespace-wide (or cluster-wide) authentication policy.
pub const DEFAULT_AUTHENTICATION_POLICY_NAME: &str = "default";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Policy {
    pub targets: Vec<TargetSelector>,
    pub peers: Vec<PeerAuthenticationMethod>,
    pub origins: Vec<OriginAuthenticationMethod>,
}

/// A workload the policy applies to, by short service name and ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TargetSelector {
    pub name: String,
    pub ports: Vec<PortSelector>,
}

impl TargetSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ports: Vec::new() }
    }
}

/// Peer authentication. The method is a oneof and may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PeerAuthenticationMethod {
    #[serde(flatten)]
    pub params: Option<PeerMethod>,
}

impl PeerAuthenticationMethod {
    pub fn jwt(jwt: Jwt) -> Self {
        Self { params: Some(PeerMethod::Jwt(jwt)) }
    }

    pub fn mtls() -> Self {
        Self { params: Some(PeerMethod::Mtls(MutualTls::default())) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeerMethod {
    Mtls(MutualTls),
    Jwt(Jwt),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MutualTls {
    pub allow_tls: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OriginAuthenticationMethod {
    pub jwt: Option<Jwt>,
}

impl OriginAuthenticationMethod {
    pub fn jwt(jwt: Jwt) -> Self {
        Self { jwt: Some(jwt) }
    }
}

/// JSON Web Token issuer settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Jwt {
    pub issuer: String,
    pub audiences: Vec<String>,
    pub jwks_uri: String,
    pub jwt_headers: Vec<String>,
    pub jwt_params: Vec<String>,
}

impl Jwt {
    pub fn issuer(issuer: impl Into<String>) -> Self {
        Self { issuer: issuer.into(), ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_reads_peers_and_origins() {
        let policy: Policy = serde_yaml::from_str(
            r#"
targets:
  - name: reviews
    ports: [{number: 9080}, {name: http}]
peers:
  - mtls: {}
  - jwt:
      issuer: https://accounts.example.com
      jwksUri: https://accounts.example.com/keys
origins:
  - jwt:
      issuer: https://other.example.com
"#,
        )
        .unwrap();
        assert_eq!(policy.targets[0].ports, vec![PortSelector::number(9080), PortSelector::name("http")]);
        assert_eq!(policy.peers[0], PeerAuthenticationMethod::mtls());
        assert!(matches!(&policy.peers[1].params, Some(PeerMethod::Jwt(jwt)) if jwt.jwks_uri.ends_with("/keys")));
        assert_eq!(policy.origins[0].jwt.as_ref().map(|j| j.issuer.as_str()), Some("https://other.example.com"));
    }
}
