//! Distributes TLS trust between related peers.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use truststore::{OperatorConfig, Reconciler, UnitStatus};
//!
//! fn on_certificates_changed(
//!     trust: &mut [impl truststore::RelationView],
//!     ca: &[impl truststore::RelationView],
//!     is_leader: bool,
//! ) -> UnitStatus {
//!     let reconciler = Reconciler::new(OperatorConfig::default());
//!     let result = reconciler.reconcile(trust, ca, is_leader);
//!     UnitStatus::from_pass(&result)
//! }
//! ```
//!
//! The host feeds relation events in and renders the returned status; the
//! engine itself never blocks, retries or elects a leader.

#![doc(html_root_url = "https://docs.rs/truststore/0.1.0")]

// Re-export core types
pub use truststore_core::*;

// Re-export the engine
pub use truststore_operator::*;

// Re-export serialization for harnesses
pub use serde;
pub use serde_json;
