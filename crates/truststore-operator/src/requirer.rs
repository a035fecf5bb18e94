//! The requirer side of the truststore relation.
//!
//! A requirer submits its own CSR through its unit databag and reads back
//! the trust map the truststore leader publishes.

use tracing::debug;
use truststore_core::{Result, TrustMap, TrustRecord};

use crate::config::OperatorConfig;
use crate::guard::{require_single, require_single_mut};
use crate::relation::{LocalStore, RelationView};

/// Requirer endpoint of the truststore relation.
#[derive(Debug, Clone)]
pub struct TrustRequirer {
    relation: String,
    csr_field: String,
    trust_field: String,
}

impl TrustRequirer {
    /// Requirer using the relation and field names from `config`
    #[must_use]
    pub fn new(config: &OperatorConfig) -> Self {
        Self {
            relation: config.truststore_relation.clone(),
            csr_field: config.fields.csr.clone(),
            trust_field: config.fields.trust.clone(),
        }
    }

    /// Relation endpoint name
    #[must_use]
    pub fn relation_name(&self) -> &str {
        &self.relation
    }

    /// A requirer talks to exactly one truststore.
    #[must_use]
    pub const fn is_ready<R>(&self, scopes: &[R]) -> bool {
        scopes.len() == 1
    }

    /// The truststore relation, or a cardinality error.
    pub fn relation<'a, R: RelationView>(&self, scopes: &'a [R]) -> Result<&'a R> {
        Ok(require_single(&self.relation, scopes)?)
    }

    /// Write `csr` into the local unit databag, keeping other keys.
    ///
    /// Returns false if the same CSR was already submitted.
    pub fn submit_csr<R: RelationView>(&self, scopes: &mut [R], csr: &str) -> Result<bool> {
        let scope = require_single_mut(&self.relation, scopes)?;
        let mut data = scope.local_data(LocalStore::Unit)?;
        if data.get(&self.csr_field).map(String::as_str) == Some(csr) {
            return Ok(false);
        }
        data.insert(self.csr_field.clone(), csr.to_string());
        scope.replace_local_data(LocalStore::Unit, data)?;
        debug!(relation = %self.relation, "submitted CSR");
        Ok(true)
    }

    /// The trust map published by the truststore; empty until first publication.
    pub fn trust<R: RelationView>(&self, scopes: &[R]) -> Result<TrustMap> {
        let scope = self.relation(scopes)?;
        let data = scope.remote_app_data()?;
        match data.get(&self.trust_field) {
            Some(raw) if !raw.trim().is_empty() => {
                let publisher = scope.remote_app().unwrap_or(&self.relation);
                Ok(TrustMap::from_published(publisher, raw)?)
            }
            _ => Ok(TrustMap::new()),
        }
    }

    /// This unit's own record in the published trust map.
    pub fn own_record<R: RelationView>(&self, scopes: &[R]) -> Result<Option<TrustRecord>> {
        let own = self.relation(scopes)?.local_identity();
        Ok(self.trust(scopes)?.get(own).cloned())
    }
}
