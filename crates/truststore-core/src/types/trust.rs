//! The published trust map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::RequesterIdentity;
use crate::error::{ParseError, Result};

/// Certificate material matched to one requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRecord {
    /// Issued certificate
    pub certificate: String,
    /// Issuing CA certificate
    pub ca: String,
    /// Certificate chain, leaf first
    pub chain: Vec<String>,
}

/// Mapping from requester identity to its matched trust material.
///
/// Backed by a `BTreeMap` so the serialized form has sorted keys and the
/// same content always renders to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustMap(BTreeMap<RequesterIdentity, TrustRecord>);

impl TrustMap {
    /// Create an empty trust map
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert or replace the record for a requester
    pub fn insert(&mut self, requester: RequesterIdentity, record: TrustRecord) -> Option<TrustRecord> {
        self.0.insert(requester, record)
    }

    /// Record for a requester, if resolved
    #[must_use]
    pub fn get(&self, requester: &str) -> Option<&TrustRecord> {
        self.0.get(requester)
    }

    /// Whether a requester has been resolved
    #[must_use]
    pub fn contains(&self, requester: &str) -> bool {
        self.0.contains_key(requester)
    }

    /// Number of resolved requesters
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing has been resolved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&RequesterIdentity, &TrustRecord)> {
        self.0.iter()
    }

    /// Resolved requesters in key order
    pub fn requesters(&self) -> impl Iterator<Item = &RequesterIdentity> {
        self.0.keys()
    }

    /// Render the canonical published representation: compact JSON, keys sorted.
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Parse a published representation read from `publisher`'s databag.
    pub fn from_published(publisher: &str, raw: &str) -> std::result::Result<Self, ParseError> {
        serde_json::from_str(raw)
            .map_err(|e| ParseError::new(publisher, format!("invalid trust map: {e}")))
    }
}

impl FromIterator<(RequesterIdentity, TrustRecord)> for TrustMap {
    fn from_iter<T: IntoIterator<Item = (RequesterIdentity, TrustRecord)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TrustMap {
    type Item = (&'a RequesterIdentity, &'a TrustRecord);
    type IntoIter = std::collections::btree_map::Iter<'a, RequesterIdentity, TrustRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
