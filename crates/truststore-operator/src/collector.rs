//! CSR collection from remote requirers.

use tracing::{debug, instrument};
use truststore_core::{token_field, CertificateRequest, TransportError};

use crate::relation::RelationView;

/// Requests gathered from one relation instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Submitted requests, in remote enumeration order
    pub requests: Vec<CertificateRequest>,
}

/// Collect pending CSRs from every remote unit of `scope`.
///
/// The local unit is never a requester. Units that have not written a CSR
/// yet are skipped. CSRs are opaque: whatever a unit wrote is carried
/// through unchanged. A transport failure aborts the whole collection.
#[instrument(skip_all, fields(relation = scope.name(), id = scope.id()))]
pub fn collect<R: RelationView + ?Sized>(
    scope: &R,
    csr_field: &str,
) -> Result<Collection, TransportError> {
    let mut collection = Collection::default();

    for remote in scope.remote_identities()? {
        if remote.as_str() == scope.local_identity() {
            continue;
        }

        let data = scope.remote_data(&remote)?;
        match token_field(&data, csr_field) {
            Some(csr) => collection.requests.push(CertificateRequest {
                requester: remote,
                csr,
            }),
            None => debug!(requester = %remote, "no CSR submitted yet"),
        }
    }

    debug!(requests = collection.requests.len(), "collected CSRs");
    Ok(collection)
}
