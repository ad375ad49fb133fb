//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the VoteDesk application.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{Result, VoteDeskError};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer when dropped and must be held
/// for as long as the process logs.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, "votedesk.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| VoteDeskError::Config(format!("Invalid log filter: {}", e)))?;

    let file_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| VoteDeskError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log an accepted vote
pub fn log_vote_cast(session_id: i64, position_id: i64, candidate_id: i64, voter_id: i64) {
    info!(
        session_id = session_id,
        position_id = position_id,
        candidate_id = candidate_id,
        voter_id = voter_id,
        "Vote accepted"
    );
}

/// Log a rejected vote attempt
pub fn log_vote_rejected(position_id: i64, candidate_id: i64, voter_id: i64, reason: &str) {
    warn!(
        position_id = position_id,
        candidate_id = candidate_id,
        voter_id = voter_id,
        reason = reason,
        "Vote rejected"
    );
}

/// Log a verification outcome
pub fn log_verification(voter_id: Option<i64>, accepted: bool, source_ip: Option<&str>, reason: Option<&str>) {
    if accepted {
        info!(voter_id = voter_id, source_ip = source_ip, "Voter verified");
    } else {
        warn!(
            voter_id = voter_id,
            source_ip = source_ip,
            reason = reason,
            "Voter verification rejected"
        );
    }
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
