//! # truststore-operator
//!
//! Trust reconciliation and publication engine.
//!
//! Requirers write certificate-signing requests into the truststore
//! relation; a CA integration publishes certificates issued for them. On
//! every relation event the truststore leader runs one synchronous pass
//! that pairs the two and publishes a per-requester trust map back to the
//! requirers.
//!
//! ## Data Flow
//!
//! ```text
//! tls-truststore event
//!   guard::readiness()          at least one relation, leader
//!   collector::collect()        CSRs from remote units
//!   Reconciler::forward()       CSRs -> CA integration
//!
//! tls-certificates event
//!   guard::readiness()          at least one truststore relation, one CA relation, leader
//!   issuance::issued_certificates()
//!   collector::collect() + matcher::match_requests()
//!   publisher::publish_rendered()   full overwrite of the application databag
//! ```
//!
//! Passes are pure functions of the relation data visible at call time, so
//! replaying an event reproduces the same publication without writing.
//! Leader election, retries and status rendering belong to the host.

pub mod collector;
pub mod config;
pub mod guard;
pub mod issuance;
pub mod matcher;
pub mod publisher;
pub mod reconcile;
pub mod relation;
pub mod requirer;
pub mod stash;

pub use collector::{collect, Collection};
pub use config::{FieldConfig, OperatorConfig};
pub use guard::{readiness, require_leader, require_single, Access, CardinalityPolicy, Readiness};
pub use issuance::{forward_requests, issued_certificates, CertificateIssuer};
pub use matcher::match_requests;
pub use publisher::{publish, publish_rendered, Publication, Published};
pub use reconcile::{BlockReason, PassOutcome, PassReport, Reconciler, ScopeReport, UnitStatus, WaitReason};
pub use relation::{LocalStore, MemoryRelation, RelationView};
pub use requirer::TrustRequirer;
pub use stash::{CsrGenerator, PeerKeyStash, StashOutcome};
