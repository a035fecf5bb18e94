//! Certificate requests and issued certificates.

use serde::{Deserialize, Serialize};

use super::{RequesterIdentity, TrustRecord};

/// A pending certificate-signing request submitted by a remote peer.
///
/// The `csr` is only ever compared for equality; its content is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRequest {
    /// Peer that submitted the request
    pub requester: RequesterIdentity,
    /// Opaque correlation token (normally a PEM-encoded CSR)
    pub csr: String,
}

impl CertificateRequest {
    /// Create a request
    #[must_use]
    pub fn new(requester: impl Into<RequesterIdentity>, csr: impl Into<String>) -> Self {
        Self {
            requester: requester.into(),
            csr: csr.into(),
        }
    }
}

/// A certificate issued by the CA integration for a previously seen CSR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCertificate {
    /// CSR this certificate was issued for
    #[serde(alias = "certificate_signing_request")]
    pub csr: String,
    /// Issued certificate
    pub certificate: String,
    /// Issuing CA certificate
    pub ca: String,
    /// Certificate chain, leaf first
    #[serde(default)]
    pub chain: Vec<String>,
}

impl IssuedCertificate {
    /// Create an issued certificate
    #[must_use]
    pub fn new<I, S>(
        csr: impl Into<String>,
        certificate: impl Into<String>,
        ca: impl Into<String>,
        chain: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            csr: csr.into(),
            certificate: certificate.into(),
            ca: ca.into(),
            chain: chain.into_iter().map(Into::into).collect(),
        }
    }

    /// The trust material handed to the requester of this certificate
    #[must_use]
    pub fn trust_record(&self) -> TrustRecord {
        TrustRecord {
            certificate: self.certificate.clone(),
            ca: self.ca.clone(),
            chain: self.chain.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_provider_wire_name_for_csr() {
        let raw = r#"{
            "certificate_signing_request": "123",
            "certificate": "foo",
            "ca": "bar",
            "chain": ["1", "2"]
        }"#;
        let issued: IssuedCertificate = serde_json::from_str(raw).unwrap();
        assert_eq!(issued, IssuedCertificate::new("123", "foo", "bar", ["1", "2"]));
    }

    #[test]
    fn chain_defaults_to_empty() {
        let raw = r#"{"csr": "123", "certificate": "foo", "ca": "bar"}"#;
        let issued: IssuedCertificate = serde_json::from_str(raw).unwrap();
        assert!(issued.chain.is_empty());
    }
}
