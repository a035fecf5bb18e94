//! Access to relation data.
//!
//! A relation connects the local unit to a set of remote units. Every
//! participant owns a databag; the local side can write its own unit databag
//! and, when leading, the application databag shared by all local units.

mod memory;

pub use memory::MemoryRelation;

use truststore_core::{Databag, RequesterIdentity, TransportError};

/// Which of the local databags an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalStore {
    /// Application databag, writable by the leader only
    Application,
    /// The local unit's own databag
    Unit,
}

/// Read/write view over one relation instance.
///
/// Implementations are synchronous: every call returns the data visible at
/// call time or fails with a [`TransportError`].
pub trait RelationView {
    /// Relation endpoint name, e.g. `tls-truststore`
    fn name(&self) -> &str;

    /// Relation instance id
    fn id(&self) -> u64;

    /// Identity of the local unit
    fn local_identity(&self) -> &str;

    /// Application name of the remote side, once known
    fn remote_app(&self) -> Option<&str>;

    /// Remote units currently in the relation, in enumeration order
    fn remote_identities(&self) -> Result<Vec<RequesterIdentity>, TransportError>;

    /// Databag of one remote unit
    fn remote_data(&self, remote: &RequesterIdentity) -> Result<Databag, TransportError>;

    /// Application databag of the remote side
    fn remote_app_data(&self) -> Result<Databag, TransportError>;

    /// One of the local databags
    fn local_data(&self, store: LocalStore) -> Result<Databag, TransportError>;

    /// Replace one of the local databags wholesale
    fn replace_local_data(&mut self, store: LocalStore, data: Databag) -> Result<(), TransportError>;
}
