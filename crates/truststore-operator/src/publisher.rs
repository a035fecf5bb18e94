//! Publishing the trust map to requirers.

use tracing::{debug, info, instrument};
use truststore_core::{Databag, Result, TrustMap};

use crate::guard::require_leader;
use crate::relation::{LocalStore, RelationView};

/// A trust map rendered to its canonical published form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    payload: String,
    entries: usize,
}

impl Publication {
    /// Render `map` canonically: compact JSON with sorted keys.
    pub fn render(map: &TrustMap) -> Result<Self> {
        Ok(Self {
            payload: map.to_canonical_json()?,
            entries: map.len(),
        })
    }

    /// The serialized trust map
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Number of requesters in the map
    #[must_use]
    pub const fn entries(&self) -> usize {
        self.entries
    }

    /// The complete application databag this publication stands for
    #[must_use]
    pub fn databag(&self, trust_field: &str) -> Databag {
        Databag::from([(trust_field.to_string(), self.payload.clone())])
    }
}

/// What a publish call did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Published {
    /// The store was overwritten
    Written {
        /// Requesters published
        entries: usize,
    },
    /// The store already held this exact content; nothing was written
    Unchanged {
        /// Requesters published
        entries: usize,
    },
}

impl Published {
    /// Requesters in the published map
    #[must_use]
    pub const fn entries(self) -> usize {
        match self {
            Self::Written { entries } | Self::Unchanged { entries } => entries,
        }
    }

    /// Returns true if the store was written
    #[must_use]
    pub const fn was_written(self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Publish `map` into the application databag of `scope`.
///
/// Fails with a leadership error before touching the store unless
/// `is_leader` holds. The databag is replaced wholesale; prior keys do not
/// survive.
pub fn publish<R: RelationView + ?Sized>(
    map: &TrustMap,
    scope: &mut R,
    is_leader: bool,
    trust_field: &str,
) -> Result<Published> {
    require_leader(is_leader, "publish trust")?;
    let publication = Publication::render(map)?;
    write(&publication, scope, trust_field)
}

/// Publish an already rendered map. Same contract as [`publish`].
pub fn publish_rendered<R: RelationView + ?Sized>(
    publication: &Publication,
    scope: &mut R,
    is_leader: bool,
    trust_field: &str,
) -> Result<Published> {
    require_leader(is_leader, "publish trust")?;
    write(publication, scope, trust_field)
}

#[instrument(skip_all, fields(relation = scope.name(), id = scope.id(), entries = publication.entries()))]
fn write<R: RelationView + ?Sized>(
    publication: &Publication,
    scope: &mut R,
    trust_field: &str,
) -> Result<Published> {
    let entries = publication.entries();
    let desired = publication.databag(trust_field);

    if scope.local_data(LocalStore::Application)? == desired {
        debug!("trust map unchanged, skipping write");
        return Ok(Published::Unchanged { entries });
    }

    scope.replace_local_data(LocalStore::Application, desired)?;
    info!("published trust map");
    Ok(Published::Written { entries })
}
