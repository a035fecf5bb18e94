use thiserror::Error;

/// Result type alias for truststore operations
pub type Result<T> = std::result::Result<T, TrustStoreError>;

/// A relation that must exist exactly once was absent or duplicated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardinalityError {
    /// No relation with this name is established
    #[error("exactly one `{relation}` relation is required, found none")]
    Zero {
        /// Relation endpoint name
        relation: String,
    },

    /// More than one relation with this name is established
    #[error("exactly one `{relation}` relation is required, found {count}")]
    Multiple {
        /// Relation endpoint name
        relation: String,
        /// Number of relations found
        count: usize,
    },
}

/// Reading or writing relation data failed in the underlying transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport failure on `{relation}`: {message}")]
pub struct TransportError {
    /// Relation endpoint the failure occurred on
    pub relation: String,
    /// Description from the transport
    pub message: String,
}

impl TransportError {
    /// Create a transport error for a relation
    #[must_use]
    pub fn new(relation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            message: message.into(),
        }
    }
}

/// Data published by a relation participant did not match its schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed data from `{identity}`: {reason}")]
pub struct ParseError {
    /// Identity of the participant whose data is malformed
    pub identity: String,
    /// What was wrong with it
    pub reason: String,
}

impl ParseError {
    /// Create a parse error naming the offending participant
    #[must_use]
    pub fn new(identity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the truststore engine
#[derive(Error, Debug)]
pub enum TrustStoreError {
    /// An exactly-one relation precondition was violated
    #[error(transparent)]
    RelationCardinality(#[from] CardinalityError),

    /// A mutating call was made without holding leadership
    #[error("leadership required to {operation}")]
    Leadership {
        /// The refused operation
        operation: &'static str,
    },

    /// Relation data could not be read or written
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Relation data did not match its schema
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Private key or CSR generation failed
    #[error("key material error: {0}")]
    KeyMaterial(String),

    /// Configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrustStoreError {
    /// Returns true if the error came from the relation transport
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true if the error is a refused write for lack of leadership
    #[must_use]
    pub const fn is_leadership(&self) -> bool {
        matches!(self, Self::Leadership { .. })
    }

    /// Returns true if the relation topology is wrong
    #[must_use]
    pub const fn is_cardinality(&self) -> bool {
        matches!(self, Self::RelationCardinality(_))
    }
}
