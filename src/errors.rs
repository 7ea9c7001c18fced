//! Error types for domain operations

use crate::status::WorkItemKind;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in domain operations
///
/// Guard and validation failures are returned as values and recovered at the
/// operation boundary; they never leave the aggregate in a partially mutated
/// state. Only [`DomainError::Unexpected`] represents a fault that callers
/// should surface generically.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Malformed input, caught before any mutation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A transition guard rejected the operation from the current status
    #[error("{operation} is not allowed for {kind} in status {from}")]
    InvalidTransition {
        /// The kind of work item the operation was invoked on
        kind: WorkItemKind,
        /// The operation that was rejected
        operation: &'static str,
        /// The current status the guard evaluated
        from: &'static str,
    },

    /// The id did not resolve within the caller's tenant scope
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The kind of work item that was looked up
        kind: WorkItemKind,
        /// The id that was searched for
        id: Uuid,
    },

    /// The aggregate exists but belongs to another tenant, or the actor is
    /// missing a required role
    ///
    /// Distinct from [`DomainError::NotFound`] so that "exists but not yours"
    /// never reads as "does not exist".
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The aggregate was modified concurrently since it was loaded
    #[error("Concurrency conflict: expected version {expected}, but found {actual}")]
    ConcurrencyConflict {
        /// The version the caller loaded
        expected: u64,
        /// The version currently persisted
        actual: u64,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other fault - logged, generic message surfaced
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        DomainError::Forbidden(msg.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    /// Check if this is a guard rejection
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, DomainError::InvalidTransition { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }

    /// Check if this is a concurrency error
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, DomainError::ConcurrencyConflict { .. })
    }
}
