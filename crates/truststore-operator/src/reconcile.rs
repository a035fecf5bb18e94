//! One reconciliation pass: guard, collect, match, publish.
//!
//! ```text
//! WaitingForRelation -> WaitingForLeadership -> Reconciling -> Published
//!                                                   |
//!                                                   +-> Error (transport)
//! ```
//!
//! Any unmet precondition short-circuits to the matching waiting outcome.
//! All relation reads of a pass complete before its first write, so a read
//! failure never leaves a partial publication behind.

use tracing::{debug, info, instrument, warn};
use truststore_core::{Databag, Result, TrustStoreError};

use crate::collector::{collect, Collection};
use crate::config::OperatorConfig;
use crate::guard::{readiness, Access, CardinalityPolicy, Readiness};
use crate::issuance::{forward_requests, issued_certificates, CertificateIssuer};
use crate::matcher::match_requests;
use crate::publisher::{publish_rendered, Publication};
use crate::relation::{LocalStore, RelationView};

/// Per-relation summary of a publishing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeReport {
    /// Relation instance id
    pub relation_id: u64,
    /// Requests found
    pub requests: usize,
    /// Requesters resolved and published
    pub matched: usize,
    /// Whether the store was written (false when already up to date)
    pub written: bool,
}

/// Summary of a publishing pass over all truststore relations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// One entry per relation, in the order given
    pub scopes: Vec<ScopeReport>,
}

impl PassReport {
    /// Requesters published across all relations
    #[must_use]
    pub fn entries(&self) -> usize {
        self.scopes.iter().map(|s| s.matched).sum()
    }

    /// Requests still waiting for a certificate
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.scopes.iter().map(|s| s.requests.saturating_sub(s.matched)).sum()
    }

    /// Relations whose store was written
    #[must_use]
    pub fn writes(&self) -> usize {
        self.scopes.iter().filter(|s| s.written).count()
    }
}

/// How a pass ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// A precondition is unmet; retry on the next event
    Waiting(Readiness),
    /// The CA lists no certificates; nothing was written.
    ///
    /// A previous publication stays in place, so a CA that withdraws every
    /// certificate does not empty the trust maps. Withdrawing only some of
    /// them shrinks the maps on the next pass.
    AwaitingIssuance,
    /// Trust maps were published
    Published(PassReport),
    /// CSRs were forwarded to the CA
    Forwarded {
        /// Distinct CSRs forwarded
        csrs: usize,
    },
}

/// Why a unit is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    /// Missing relation
    Relation,
    /// Not the leader
    Leadership,
    /// Nothing issued yet
    Issuance,
}

/// Why a unit is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Wrong number of relations
    Cardinality,
    /// Write attempted without leadership
    Leadership,
    /// Relation data could not be read or written
    Transport,
    /// Relation data did not match its schema
    Malformed,
    /// Anything else
    Internal,
}

/// Status a harness should show for a pass result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    /// Everything published or forwarded
    Active,
    /// Retry on the next event
    Waiting(WaitReason),
    /// Needs intervention or a fresh event
    Blocked(BlockReason),
}

impl UnitStatus {
    /// Map a pass result to a unit status.
    #[must_use]
    pub fn from_pass(result: &Result<PassOutcome>) -> Self {
        match result {
            Ok(PassOutcome::Waiting(Readiness::WaitingForRelation)) => Self::Waiting(WaitReason::Relation),
            Ok(PassOutcome::Waiting(Readiness::WaitingForLeadership)) => Self::Waiting(WaitReason::Leadership),
            Ok(PassOutcome::AwaitingIssuance) => Self::Waiting(WaitReason::Issuance),
            Ok(PassOutcome::Waiting(Readiness::Ready) | PassOutcome::Published(_) | PassOutcome::Forwarded { .. }) => {
                Self::Active
            }
            Err(TrustStoreError::RelationCardinality(_)) => Self::Blocked(BlockReason::Cardinality),
            Err(TrustStoreError::Leadership { .. }) => Self::Blocked(BlockReason::Leadership),
            Err(TrustStoreError::Transport(_)) => Self::Blocked(BlockReason::Transport),
            Err(TrustStoreError::Parse(_)) => Self::Blocked(BlockReason::Malformed),
            Err(_) => Self::Blocked(BlockReason::Internal),
        }
    }
}

/// Runs reconciliation passes for the truststore leader.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: OperatorConfig,
}

impl Reconciler {
    /// Reconciler using the given relation and field names
    #[must_use]
    pub const fn new(config: OperatorConfig) -> Self {
        Self { config }
    }

    /// Publish, into every truststore relation, the trust map of its
    /// requesters against the certificates issued on the CA relation.
    ///
    /// Relations are written one after another. If a write fails, the
    /// relations already written in this pass get their previous databag
    /// back before the error is returned. That restore is best effort: a
    /// relation that refuses it keeps the new map and is logged.
    #[instrument(skip_all, fields(relation = %self.config.truststore_relation, leader = is_leader))]
    pub fn reconcile<T, C>(&self, trust: &mut [T], ca: &[C], is_leader: bool) -> Result<PassOutcome>
    where
        T: RelationView,
        C: RelationView,
    {
        let ready = readiness(
            &self.config.truststore_relation,
            &*trust,
            CardinalityPolicy::AtLeastOne,
            Access::Mutate { is_leader },
        )?;
        if !ready.is_ready() {
            debug!(?ready, "truststore not ready");
            return Ok(PassOutcome::Waiting(ready));
        }

        let upstream = readiness(
            &self.config.certificates_relation,
            ca,
            CardinalityPolicy::ExactlyOne,
            Access::Read,
        )?;
        if !upstream.is_ready() {
            debug!(relation = %self.config.certificates_relation, "waiting for CA relation");
            return Ok(PassOutcome::Waiting(upstream));
        }

        let issued = issued_certificates(
            &self.config.certificates_relation,
            ca,
            &self.config.fields.certificates,
        )?;
        if issued.is_empty() {
            debug!("no certificates issued yet");
            return Ok(PassOutcome::AwaitingIssuance);
        }

        let mut staged: Vec<(Collection, Publication, Databag)> = Vec::with_capacity(trust.len());
        for scope in trust.iter() {
            let collection = collect(scope, &self.config.fields.csr)?;
            let map = match_requests(&collection.requests, &issued);
            let prior = scope.local_data(LocalStore::Application)?;
            staged.push((collection, Publication::render(&map)?, prior));
        }

        let mut report = PassReport::default();
        let mut priors = Vec::with_capacity(staged.len());
        for (index, (collection, publication, prior)) in staged.into_iter().enumerate() {
            let scope = &mut trust[index];
            let relation_id = scope.id();
            let published = match publish_rendered(&publication, scope, is_leader, &self.config.fields.trust) {
                Ok(published) => published,
                Err(e) => {
                    restore(&mut trust[..index], priors);
                    return Err(e);
                }
            };
            priors.push(published.was_written().then_some(prior));
            report.scopes.push(ScopeReport {
                relation_id,
                requests: collection.requests.len(),
                matched: published.entries(),
                written: published.was_written(),
            });
        }

        info!(
            relations = report.scopes.len(),
            entries = report.entries(),
            unresolved = report.unresolved(),
            writes = report.writes(),
            "reconciled truststore"
        );
        Ok(PassOutcome::Published(report))
    }

    /// Forward every requester's CSR to the CA.
    #[instrument(skip_all, fields(relation = %self.config.truststore_relation, leader = is_leader))]
    pub fn forward<T, I>(&self, trust: &[T], issuer: &mut I, is_leader: bool) -> Result<PassOutcome>
    where
        T: RelationView,
        I: CertificateIssuer + ?Sized,
    {
        let ready = readiness(
            &self.config.truststore_relation,
            trust,
            CardinalityPolicy::AtLeastOne,
            Access::Mutate { is_leader },
        )?;
        if !ready.is_ready() {
            debug!(?ready, "truststore not ready");
            return Ok(PassOutcome::Waiting(ready));
        }

        let mut requests = Vec::new();
        for scope in trust {
            requests.extend(collect(scope, &self.config.fields.csr)?.requests);
        }

        let csrs = forward_requests(&requests, issuer)?;
        info!(csrs, "forwarded CSRs to CA");
        Ok(PassOutcome::Forwarded { csrs })
    }
}

/// Put back the databags a failed pass overwrote.
fn restore<T: RelationView>(written: &mut [T], priors: Vec<Option<Databag>>) {
    for (scope, prior) in written.iter_mut().zip(priors) {
        let Some(prior) = prior else { continue };
        if let Err(e) = scope.replace_local_data(LocalStore::Application, prior) {
            warn!(relation = scope.name(), id = scope.id(), error = %e, "could not restore previous trust map");
        }
    }
}
