//! In-memory relation backend.
//!
//! Holds every databag of one relation instance in plain maps. Used by tests
//! and by harnesses that mirror relation data themselves. Reads and writes
//! can be made to fail to exercise transport error paths.

use tracing::debug;
use truststore_core::{Databag, RequesterIdentity, TransportError};

use super::{LocalStore, RelationView};

/// In-memory relation instance
#[derive(Debug, Clone, Default)]
pub struct MemoryRelation {
    name: String,
    id: u64,
    local_identity: String,
    remote_app: Option<String>,
    remote_app_data: Databag,
    remotes: Vec<(RequesterIdentity, Databag)>,
    app_data: Databag,
    unit_data: Databag,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

impl MemoryRelation {
    /// Create an empty relation seen from `local_identity`
    #[must_use]
    pub fn new(name: impl Into<String>, id: u64, local_identity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id,
            local_identity: local_identity.into(),
            ..Self::default()
        }
    }

    /// Set the remote application name
    #[must_use]
    pub fn with_remote_app(mut self, app: impl Into<String>) -> Self {
        self.remote_app = Some(app.into());
        self
    }

    /// Add a remote unit with its databag
    #[must_use]
    pub fn with_remote(mut self, identity: impl Into<RequesterIdentity>, data: Databag) -> Self {
        self.join(identity, data);
        self
    }

    /// A remote unit joins, or replaces its databag if already present
    pub fn join(&mut self, identity: impl Into<RequesterIdentity>, data: Databag) {
        let identity = identity.into();
        match self.remotes.iter_mut().find(|(id, _)| *id == identity) {
            Some((_, bag)) => *bag = data,
            None => self.remotes.push((identity, data)),
        }
    }

    /// A remote unit leaves; its data disappears with it
    pub fn depart(&mut self, identity: &str) {
        self.remotes.retain(|(id, _)| id.as_str() != identity);
    }

    /// Set one field in a remote unit's databag, joining it if needed
    pub fn set_remote_field(
        &mut self,
        identity: impl Into<RequesterIdentity>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        let identity = identity.into();
        if let Some((_, bag)) = self.remotes.iter_mut().find(|(id, _)| *id == identity) {
            bag.insert(key.into(), value.into());
        } else {
            self.remotes
                .push((identity, Databag::from([(key.into(), value.into())])));
        }
    }

    /// Set one field in the remote application databag
    pub fn set_remote_app_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.remote_app_data.insert(key.into(), value.into());
    }

    /// Seed a local databag without counting it as a write
    pub fn seed_local(&mut self, store: LocalStore, data: Databag) {
        *self.store_mut(store) = data;
    }

    /// Current local databag, bypassing fault injection
    #[must_use]
    pub const fn stored(&self, store: LocalStore) -> &Databag {
        match store {
            LocalStore::Application => &self.app_data,
            LocalStore::Unit => &self.unit_data,
        }
    }

    /// Make every read fail
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every write fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful local writes so far
    #[must_use]
    pub const fn write_count(&self) -> usize {
        self.writes
    }

    fn store_mut(&mut self, store: LocalStore) -> &mut Databag {
        match store {
            LocalStore::Application => &mut self.app_data,
            LocalStore::Unit => &mut self.unit_data,
        }
    }

    fn check_read(&self) -> Result<(), TransportError> {
        if self.fail_reads {
            return Err(TransportError::new(&self.name, "relation data unavailable"));
        }
        Ok(())
    }
}

impl RelationView for MemoryRelation {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn local_identity(&self) -> &str {
        &self.local_identity
    }

    fn remote_app(&self) -> Option<&str> {
        self.remote_app.as_deref()
    }

    fn remote_identities(&self) -> Result<Vec<RequesterIdentity>, TransportError> {
        self.check_read()?;
        Ok(self.remotes.iter().map(|(id, _)| id.clone()).collect())
    }

    fn remote_data(&self, remote: &RequesterIdentity) -> Result<Databag, TransportError> {
        self.check_read()?;
        Ok(self
            .remotes
            .iter()
            .find(|(id, _)| id == remote)
            .map(|(_, bag)| bag.clone())
            .unwrap_or_default())
    }

    fn remote_app_data(&self) -> Result<Databag, TransportError> {
        self.check_read()?;
        Ok(self.remote_app_data.clone())
    }

    fn local_data(&self, store: LocalStore) -> Result<Databag, TransportError> {
        self.check_read()?;
        Ok(self.stored(store).clone())
    }

    fn replace_local_data(&mut self, store: LocalStore, data: Databag) -> Result<(), TransportError> {
        if self.fail_writes {
            return Err(TransportError::new(&self.name, "write rejected"));
        }
        debug!(relation = %self.name, id = self.id, ?store, keys = data.len(), "replacing local databag");
        *self.store_mut(store) = data;
        self.writes += 1;
        Ok(())
    }
}
