//! Matching CSRs against issued certificates.

use std::collections::HashMap;
use truststore_core::{CertificateRequest, IssuedCertificate, TrustMap};

/// Match each request to the first issued certificate carrying its CSR.
///
/// Requests without an issued certificate are left out of the map; they
/// are retried on the next pass. Several requesters sharing a CSR all
/// receive the same record. Pure: the result depends only on the inputs.
#[must_use]
pub fn match_requests(requests: &[CertificateRequest], issued: &[IssuedCertificate]) -> TrustMap {
    // First entry per CSR wins, like a linear scan would.
    let mut index: HashMap<&str, &IssuedCertificate> = HashMap::with_capacity(issued.len());
    for cert in issued {
        index.entry(cert.csr.as_str()).or_insert(cert);
    }

    requests
        .iter()
        .filter_map(|request| {
            index
                .get(request.csr.as_str())
                .map(|cert| (request.requester.clone(), cert.trust_record()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use truststore_core::TrustRecord;

    fn requests() -> Vec<CertificateRequest> {
        vec![
            CertificateRequest::new("u/0", "123"),
            CertificateRequest::new("u/1", "1234"),
            CertificateRequest::new("u/2", "12345"),
        ]
    }

    fn issued() -> Vec<IssuedCertificate> {
        vec![
            IssuedCertificate::new("123", "foo", "bar", ["1", "2"]),
            IssuedCertificate::new("1234", "foos", "baz", ["1", "3"]),
        ]
    }

    #[test]
    fn nothing_issued_yet() {
        assert!(match_requests(&requests(), &[]).is_empty());
    }

    #[test]
    fn full_match_leaves_unissued_out() {
        let map = match_requests(&requests(), &issued());

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("u/0"),
            Some(&TrustRecord {
                certificate: "foo".into(),
                ca: "bar".into(),
                chain: vec!["1".into(), "2".into()],
            })
        );
        assert_eq!(
            map.get("u/1"),
            Some(&TrustRecord {
                certificate: "foos".into(),
                ca: "baz".into(),
                chain: vec!["1".into(), "3".into()],
            })
        );
        assert!(!map.contains("u/2"));
    }

    #[test]
    fn deterministic() {
        let first = match_requests(&requests(), &issued());
        let second = match_requests(&requests(), &issued());
        assert_eq!(first, second);
        assert_eq!(
            first.to_canonical_json().unwrap(),
            second.to_canonical_json().unwrap()
        );
    }

    #[test]
    fn shared_csr_fans_out() {
        let requests = vec![
            CertificateRequest::new("a/0", "shared"),
            CertificateRequest::new("b/0", "shared"),
        ];
        let issued = vec![IssuedCertificate::new("shared", "cert", "ca", ["c"])];

        let map = match_requests(&requests, &issued);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a/0"), map.get("b/0"));
    }

    #[test]
    fn earliest_duplicate_wins() {
        let requests = vec![CertificateRequest::new("a/0", "dup")];
        let issued = vec![
            IssuedCertificate::new("dup", "first", "ca", Vec::<String>::new()),
            IssuedCertificate::new("dup", "second", "ca", Vec::<String>::new()),
        ];

        let map = match_requests(&requests, &issued);
        assert_eq!(map.get("a/0").unwrap().certificate, "first");
    }

    #[test]
    fn agrees_with_linear_scan() {
        let requests: Vec<_> = (0..40)
            .map(|i| CertificateRequest::new(format!("u/{i}"), format!("csr-{}", i % 7)))
            .collect();
        let issued: Vec<_> = (0..30)
            .map(|i| {
                IssuedCertificate::new(format!("csr-{}", i % 5), format!("cert-{i}"), "ca", [format!("{i}")])
            })
            .collect();

        let map = match_requests(&requests, &issued);
        for request in &requests {
            let linear = issued.iter().find(|c| c.csr == request.csr);
            assert_eq!(
                map.get(request.requester.as_str()),
                linear.map(IssuedCertificate::trust_record).as_ref()
            );
        }
    }
}
