//! Domain errors for the pollwise closure and guide system.

use thiserror::Error;
use uuid::Uuid;

/// Why a supervised request was told to stop at a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancellationError {
    #[error("registry is shutting down")]
    ShuttingDown,

    #[error("request {key} was superseded by a newer request")]
    Superseded { key: String },

    #[error("request {key} is no longer registered")]
    Released { key: String },

    #[error("request {key} was cancelled by its caller")]
    Cancelled { key: String },
}

/// Domain-level errors that can occur in the pollwise system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Vote not found: {0}")]
    VoteNotFound(Uuid),

    #[error("Tail not found for vote: {0}")]
    TailNotFound(Uuid),

    #[error("Vote {0} has no options")]
    OptionsNotFound(Uuid),

    #[error("Option {option_id} does not belong to vote {vote_id}")]
    OptionNotInVote { vote_id: Uuid, option_id: Uuid },

    #[error("User {user_id} already responded to vote {vote_id}")]
    AlreadyResponded { vote_id: Uuid, user_id: String },

    #[error("Vote is closed: {0}")]
    VoteClosed(Uuid),

    #[error("Guide reply did not match the title/content template: {0}")]
    InvalidGuideFormat(String),

    #[error("Request cancelled: {0}")]
    Cancelled(#[from] CancellationError),

    #[error("Concurrency conflict: {entity} {id} was modified")]
    ConcurrencyConflict { entity: String, id: String },

    #[error("Completion failed: {0}")]
    CompletionFailed(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    /// Business failures the immediate caller is expected to act on.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::VoteNotFound(_) | Self::TailNotFound(_) | Self::OptionsNotFound(_)
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
