//! End-to-end reconciliation scenarios over in-memory relations.

use truststore::{
    collect, match_requests, publish, Collection, Databag, IssuedCertificate, LocalStore, MemoryRelation,
    OperatorConfig, PassOutcome, Readiness, Reconciler, RequesterIdentity, TrustMap, TrustRecord, TrustRequirer,
    UnitStatus, WaitReason, CSR_FIELD, TRUST_FIELD,
};

const ISSUED: &str = r#"[
    {"certificate_signing_request": "123", "certificate": "foo", "ca": "bar", "chain": ["1", "2"]},
    {"certificate_signing_request": "1234", "certificate": "foos", "ca": "baz", "chain": ["1", "3"]}
]"#;

fn csr(value: &str) -> Databag {
    Databag::from([(CSR_FIELD.to_string(), value.to_string())])
}

fn provider() -> MemoryRelation {
    MemoryRelation::new("tls-truststore", 1, "truststore/0")
        .with_remote_app("requirers")
        .with_remote("u0", csr("123"))
        .with_remote("u1", csr("1234"))
        .with_remote("u2", csr("12345"))
}

fn ca(issued: Option<&str>) -> MemoryRelation {
    let mut rel =
        MemoryRelation::new("tls-certificates", 2, "truststore/0").with_remote_app("self-signed-certificates");
    if let Some(list) = issued {
        rel.set_remote_app_field("certificates", list);
    }
    rel
}

fn collected() -> Collection {
    collect(&provider(), CSR_FIELD).unwrap()
}

fn issued() -> Vec<IssuedCertificate> {
    vec![
        IssuedCertificate::new("123", "foo", "bar", ["1", "2"]),
        IssuedCertificate::new("1234", "foos", "baz", ["1", "3"]),
    ]
}

#[test]
fn scenario_a_no_issued_certificates() {
    let map = match_requests(&collected().requests, &[]);
    assert!(map.is_empty());

    let mut trust = [provider()];
    let result = Reconciler::default().reconcile(&mut trust, &[ca(None)], true);
    assert_eq!(UnitStatus::from_pass(&result), UnitStatus::Waiting(WaitReason::Issuance));
    assert_eq!(result.unwrap(), PassOutcome::AwaitingIssuance);
    assert!(trust[0].stored(LocalStore::Application).is_empty());
}

#[test]
fn scenario_b_full_match() {
    let map = match_requests(&collected().requests, &issued());

    let expected: TrustMap = [
        (
            RequesterIdentity::from("u0"),
            TrustRecord {
                certificate: "foo".into(),
                ca: "bar".into(),
                chain: vec!["1".into(), "2".into()],
            },
        ),
        (
            RequesterIdentity::from("u1"),
            TrustRecord {
                certificate: "foos".into(),
                ca: "baz".into(),
                chain: vec!["1".into(), "3".into()],
            },
        ),
    ]
    .into_iter()
    .collect();
    assert_eq!(map, expected);
    assert!(!map.contains("u2"));

    let mut trust = [provider()];
    let outcome = Reconciler::default()
        .reconcile(&mut trust, &[ca(Some(ISSUED))], true)
        .unwrap();
    assert!(matches!(outcome, PassOutcome::Published(ref r) if r.entries() == 2));

    let stored = trust[0].stored(LocalStore::Application);
    let published = TrustMap::from_published("truststore", &stored[TRUST_FIELD]).unwrap();
    assert_eq!(published, expected);
}

#[test]
fn scenario_c_no_ca_relation() {
    let mut trust = [provider()];
    let none: Vec<MemoryRelation> = Vec::new();

    let result = Reconciler::default().reconcile(&mut trust, &none, true);
    assert_eq!(UnitStatus::from_pass(&result), UnitStatus::Waiting(WaitReason::Relation));
    assert_eq!(
        result.unwrap(),
        PassOutcome::Waiting(Readiness::WaitingForRelation)
    );
    assert_eq!(trust[0].write_count(), 0);
}

#[test]
fn scenario_d_not_leader() {
    let map = match_requests(&collected().requests, &issued());
    assert_eq!(map.len(), 2);

    let mut rel = provider();
    let prior = Databag::from([(TRUST_FIELD.to_string(), "{}".to_string())]);
    rel.seed_local(LocalStore::Application, prior.clone());

    let err = publish(&map, &mut rel, false, TRUST_FIELD).unwrap_err();
    assert!(err.is_leadership());
    assert_eq!(rel.stored(LocalStore::Application), &prior);

    let mut trust = [rel];
    let outcome = Reconciler::default()
        .reconcile(&mut trust, &[ca(Some(ISSUED))], false)
        .unwrap();
    assert_eq!(outcome, PassOutcome::Waiting(Readiness::WaitingForLeadership));
    assert_eq!(trust[0].stored(LocalStore::Application), &prior);
}

#[test]
fn publication_is_idempotent() {
    let map = match_requests(&collected().requests, &issued());
    let mut rel = provider();

    publish(&map, &mut rel, true, TRUST_FIELD).unwrap();
    let first = rel.stored(LocalStore::Application).clone();
    publish(&map, &mut rel, true, TRUST_FIELD).unwrap();

    assert_eq!(rel.stored(LocalStore::Application), &first);
    assert_eq!(rel.write_count(), 1);
}

#[test]
fn data_arriving_piecemeal_converges() {
    let reconciler = Reconciler::default();
    let mut trust = [MemoryRelation::new("tls-truststore", 1, "truststore/0")];
    let mut upstream = [ca(None)];

    // A requester joins before writing its CSR.
    trust[0].join("u0", Databag::new());
    assert_eq!(
        reconciler.reconcile(&mut trust, &upstream, true).unwrap(),
        PassOutcome::AwaitingIssuance
    );

    trust[0].set_remote_field("u0", CSR_FIELD, "123");
    trust[0].set_remote_field("u1", CSR_FIELD, "1234");
    upstream[0].set_remote_app_field(
        "certificates",
        r#"[{"certificate_signing_request": "123", "certificate": "foo", "ca": "bar", "chain": []}]"#,
    );
    reconciler.reconcile(&mut trust, &upstream, true).unwrap();
    let partial = TrustMap::from_published("truststore", &trust[0].stored(LocalStore::Application)[TRUST_FIELD]).unwrap();
    assert_eq!(partial.len(), 1);

    upstream[0].set_remote_app_field("certificates", ISSUED);
    reconciler.reconcile(&mut trust, &upstream, true).unwrap();
    let full = TrustMap::from_published("truststore", &trust[0].stored(LocalStore::Application)[TRUST_FIELD]).unwrap();
    assert_eq!(full.len(), 2);

    // A requester leaving drops out of the next publication.
    trust[0].depart("u0");
    reconciler.reconcile(&mut trust, &upstream, true).unwrap();
    let after = TrustMap::from_published("truststore", &trust[0].stored(LocalStore::Application)[TRUST_FIELD]).unwrap();
    assert_eq!(after.requesters().map(|r| r.as_str()).collect::<Vec<_>>(), vec!["u1"]);
}

#[test]
fn requirer_reads_what_the_leader_published() {
    let mut provider = [provider()];
    Reconciler::default()
        .reconcile(&mut provider, &[ca(Some(ISSUED))], true)
        .unwrap();

    // The requirer sees the provider's application databag as remote app data.
    let payload = provider[0].stored(LocalStore::Application)[TRUST_FIELD].clone();
    let mut requirer_side =
        MemoryRelation::new("tls-truststore", 1, "u1").with_remote_app("truststore");
    requirer_side.set_remote_app_field(TRUST_FIELD, payload);

    let requirer = TrustRequirer::new(&OperatorConfig::default());
    let own = requirer.own_record(&[requirer_side]).unwrap().unwrap();
    assert_eq!(own.certificate, "foos");
    assert_eq!(own.chain, vec!["1", "3"]);
}
