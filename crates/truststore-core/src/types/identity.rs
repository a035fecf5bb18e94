use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Name of a relation participant, e.g. `traefik/0`.
///
/// Used as the key of the published trust map, so ordering is by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterIdentity(String);

impl RequesterIdentity {
    /// Wrap a participant name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The participant name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequesterIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequesterIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RequesterIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequesterIdentity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RequesterIdentity {
    fn from(s: String) -> Self {
        Self(s)
    }
}
