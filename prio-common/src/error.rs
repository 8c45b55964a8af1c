//! Common error types for the prioritization service

use thiserror::Error;

/// Common result type for prioritization operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Submitted data rejected by validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reasons a submission is rejected before it reaches storage or scoring
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("feature title must not be empty")]
    EmptyTitle,

    #[error("session name must not be empty")]
    EmptySessionName,

    #[error("player name must not be empty")]
    EmptyPlayerName,

    #[error("{field} must be between {min} and {max}, got {value}")]
    RatingOutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("allocation of {allocated} points exceeds the budget of {budget}")]
    OverBudget { allocated: u64, budget: u32 },

    #[error("feature {0} does not belong to this session")]
    UnknownFeature(String),

    #[error("feature {0} appears more than once in the allocation")]
    DuplicateFeature(String),

    #[error("session is {status}, votes are only accepted while active")]
    SessionNotAcceptingVotes { status: String },

    #[error("features can only be changed while the session is a draft")]
    SessionNotEditable,

    #[error("cannot move session from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },
}
