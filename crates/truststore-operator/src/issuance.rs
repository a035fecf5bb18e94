//! The CA integration side: issued certificates in, CSRs out.

use std::collections::HashSet;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use truststore_core::{json_field, CertificateRequest, IssuedCertificate, Result, TransportError};

use crate::guard::require_single;
use crate::relation::RelationView;

/// Sink for certificate requests bound for the CA.
pub trait CertificateIssuer {
    /// Ask the CA to issue a certificate for `csr`.
    fn request_certificate(&mut self, csr: &str) -> std::result::Result<(), TransportError>;
}

/// Issued certificates published by the CA application, in published order.
///
/// Requires exactly one CA relation. A missing or empty field means nothing
/// has been issued yet. Each list entry is decoded on its own: an entry that
/// does not describe a certificate is logged and skipped, and only a field
/// that is not a JSON list at all is an error.
#[instrument(skip_all, fields(relation = relation))]
pub fn issued_certificates<R: RelationView>(
    relation: &str,
    scopes: &[R],
    certificates_field: &str,
) -> Result<Vec<IssuedCertificate>> {
    let scope = require_single(relation, scopes)?;
    let data = scope.remote_app_data()?;
    let publisher = scope.remote_app().unwrap_or(relation);

    let entries: Vec<Value> = json_field(publisher, &data, certificates_field)?.unwrap_or_default();
    let mut issued = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<IssuedCertificate>(entry) {
            Ok(certificate) => issued.push(certificate),
            Err(e) => warn!(ca = publisher, index, error = %e, "skipping undecodable certificate entry"),
        }
    }
    debug!(issued = issued.len(), "read issued certificates");
    Ok(issued)
}

/// Forward the CSRs of `requests` to the CA, once per distinct CSR.
///
/// Order follows first appearance. Returns the number of CSRs forwarded.
pub fn forward_requests<I: CertificateIssuer + ?Sized>(
    requests: &[CertificateRequest],
    issuer: &mut I,
) -> std::result::Result<usize, TransportError> {
    let mut seen = HashSet::new();
    let mut forwarded = 0;

    for request in requests {
        if !seen.insert(request.csr.as_str()) {
            continue;
        }
        issuer.request_certificate(&request.csr)?;
        debug!(requester = %request.requester, "forwarded CSR to CA");
        forwarded += 1;
    }

    Ok(forwarded)
}
