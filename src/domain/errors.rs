//! Domain errors for the Reflecto pipeline.

use thiserror::Error;

/// Domain-level errors that can occur in the Reflecto system.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0} must be an integer between 1 and 10.")]
    ScoreOutOfRange(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("No date available: provide user_state.date or a dated history entry")]
    MissingDate,

    #[error("Deterministic mode requires explicit time and id providers")]
    DeterministicProviderViolation,

    #[error("Deterministic mode forbids non-deterministic LLM bridge: {0}")]
    DeterministicLlmViolation(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl DomainError {
    /// Determinism violations are fatal and must never be downgraded to a fallback.
    pub const fn is_determinism_violation(&self) -> bool {
        matches!(
            self,
            Self::DeterministicProviderViolation | Self::DeterministicLlmViolation(_)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        Self::StorageError(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
