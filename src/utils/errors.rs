//! Error handling for VoteDesk
//!
//! This module defines the main error type used throughout the application
//! and maps every failure onto the client-facing error taxonomy.

use thiserror::Error;
use crate::models::vote::RejectionReason;

/// Main error type for VoteDesk application
#[derive(Error, Debug)]
pub enum VoteDeskError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Verification gateway error: {0}")]
    Verification(#[from] VerificationError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No active election session")]
    NoActiveSession,

    #[error("Vote rejected: {0}")]
    VoteRejected(RejectionReason),

    #[error("Voter not verified")]
    NotVerified,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Verification gateway specific errors
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Verification request failed: {0}")]
    RequestFailed(String),

    #[error("Verification gateway timeout")]
    Timeout,

    #[error("Invalid verification response: {0}")]
    InvalidResponse(String),

    #[error("Verification gateway unavailable")]
    ServiceUnavailable,
}

/// Result type alias for VoteDesk operations
pub type Result<T> = std::result::Result<T, VoteDeskError>;

/// Client-facing failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing identifiers; do not retry without correction
    Validation,
    /// Business-rule rejection; never retry
    DuplicateVote,
    /// No election running; retry later
    NoActiveSession,
    /// Store or gateway temporarily unreachable; retry with backoff
    TransientUnavailability,
    /// Caller is not holding a verified ballot
    Unauthorized,
    /// Unexpected failure; not retried automatically
    Internal,
}

impl From<config::ConfigError> for VoteDeskError {
    fn from(err: config::ConfigError) -> Self {
        VoteDeskError::Config(err.to_string())
    }
}

impl VoteDeskError {
    /// Classify the error into the client-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            VoteDeskError::Database(e) => classify_sqlx(e),
            VoteDeskError::Migration(_) => ErrorKind::Internal,
            VoteDeskError::Redis(e) => {
                if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
                    ErrorKind::TransientUnavailability
                } else {
                    ErrorKind::Internal
                }
            }
            VoteDeskError::Verification(e) => match e {
                VerificationError::Timeout | VerificationError::ServiceUnavailable => {
                    ErrorKind::TransientUnavailability
                }
                VerificationError::RequestFailed(_) | VerificationError::InvalidResponse(_) => {
                    ErrorKind::Internal
                }
            },
            VoteDeskError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    ErrorKind::TransientUnavailability
                } else {
                    ErrorKind::Internal
                }
            }
            VoteDeskError::Serialization(_) => ErrorKind::Internal,
            VoteDeskError::Io(_) => ErrorKind::TransientUnavailability,
            VoteDeskError::Config(_) => ErrorKind::Internal,
            VoteDeskError::Validation(_) => ErrorKind::Validation,
            VoteDeskError::NoActiveSession => ErrorKind::NoActiveSession,
            VoteDeskError::VoteRejected(reason) => reason.kind(),
            VoteDeskError::NotVerified => ErrorKind::Unauthorized,
            VoteDeskError::RateLimitExceeded => ErrorKind::TransientUnavailability,
            VoteDeskError::Unavailable(_) => ErrorKind::TransientUnavailability,
            VoteDeskError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::TransientUnavailability | ErrorKind::NoActiveSession
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VoteDeskError::Migration(_) => ErrorSeverity::Critical,
            VoteDeskError::Config(_) => ErrorSeverity::Critical,
            VoteDeskError::Validation(_) => ErrorSeverity::Info,
            VoteDeskError::VoteRejected(_) => ErrorSeverity::Warning,
            VoteDeskError::NotVerified => ErrorSeverity::Warning,
            VoteDeskError::RateLimitExceeded => ErrorSeverity::Warning,
            VoteDeskError::NoActiveSession => ErrorSeverity::Info,
            _ => match self.kind() {
                ErrorKind::TransientUnavailability => ErrorSeverity::Warning,
                _ => ErrorSeverity::Error,
            },
        }
    }
}

fn classify_sqlx(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ErrorKind::TransientUnavailability
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => ErrorKind::Validation,
        sqlx::Error::Database(db) if db.is_check_violation() => ErrorKind::Validation,
        _ => ErrorKind::Internal,
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
