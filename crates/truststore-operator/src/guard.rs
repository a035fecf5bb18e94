//! Readiness and leadership preconditions.
//!
//! Readiness is reported as data so callers branch on the result instead of
//! on error types. Only topology errors under the exactly-one policy are
//! errors.

use truststore_core::{CardinalityError, TrustStoreError};

/// How many instances of a relation an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalityPolicy {
    /// A single upstream or downstream channel
    ExactlyOne,
    /// Fan-out to any number of peers, at least one
    AtLeastOne,
}

/// Whether an operation writes shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reads only; leadership irrelevant
    Read,
    /// Writes application data; the local unit must lead
    Mutate {
        /// Leadership flag supplied by the host
        is_leader: bool,
    },
}

/// Outcome of a precondition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
    /// All preconditions hold
    Ready,
    /// Not enough relations yet; retry on the next relation event
    WaitingForRelation,
    /// Relations are in place but this unit does not lead
    WaitingForLeadership,
}

impl Readiness {
    /// Returns true if the operation may proceed
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Evaluate relation cardinality, then leadership.
///
/// Under [`CardinalityPolicy::ExactlyOne`] a missing relation is still a
/// waiting condition, but more than one is a topology error.
pub fn readiness<R>(
    relation: &str,
    scopes: &[R],
    policy: CardinalityPolicy,
    access: Access,
) -> Result<Readiness, CardinalityError> {
    match (policy, scopes.len()) {
        (_, 0) => return Ok(Readiness::WaitingForRelation),
        (CardinalityPolicy::ExactlyOne, count) if count > 1 => {
            return Err(CardinalityError::Multiple {
                relation: relation.to_string(),
                count,
            })
        }
        _ => {}
    }

    match access {
        Access::Mutate { is_leader: false } => Ok(Readiness::WaitingForLeadership),
        Access::Read | Access::Mutate { is_leader: true } => Ok(Readiness::Ready),
    }
}

/// The single instance of a relation that must exist exactly once.
pub fn require_single<'a, R>(relation: &str, scopes: &'a [R]) -> Result<&'a R, CardinalityError> {
    match scopes {
        [single] => Ok(single),
        [] => Err(CardinalityError::Zero {
            relation: relation.to_string(),
        }),
        _ => Err(CardinalityError::Multiple {
            relation: relation.to_string(),
            count: scopes.len(),
        }),
    }
}

/// Mutable access to the single instance of a relation.
pub fn require_single_mut<'a, R>(
    relation: &str,
    scopes: &'a mut [R],
) -> Result<&'a mut R, CardinalityError> {
    let count = scopes.len();
    match scopes {
        [single] => Ok(single),
        [] => Err(CardinalityError::Zero {
            relation: relation.to_string(),
        }),
        _ => Err(CardinalityError::Multiple {
            relation: relation.to_string(),
            count,
        }),
    }
}

/// Refuse a mutating operation unless the local unit leads.
pub fn require_leader(is_leader: bool, operation: &'static str) -> Result<(), TrustStoreError> {
    if is_leader {
        Ok(())
    } else {
        Err(TrustStoreError::Leadership { operation })
    }
}
