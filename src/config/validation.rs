//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{VoteDeskError, Result};
use super::{BallotBackend, Settings};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_ballot_config(&settings.ballot, &settings.redis)?;
    validate_verification_config(&settings.verification)?;
    validate_reporting_config(&settings.reporting)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(VoteDeskError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.max_body_bytes == 0 {
        return Err(VoteDeskError::Config(
            "Max body size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(VoteDeskError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(VoteDeskError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(VoteDeskError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    if config.acquire_timeout_seconds == 0 {
        return Err(VoteDeskError::Config(
            "Database acquire timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate ballot session storage
fn validate_ballot_config(config: &super::BallotConfig, redis: &super::RedisConfig) -> Result<()> {
    if config.ttl_seconds == 0 {
        return Err(VoteDeskError::Config(
            "Ballot TTL must be greater than 0".to_string()
        ));
    }

    if config.cleanup_interval_seconds == 0 {
        return Err(VoteDeskError::Config(
            "Ballot cleanup interval must be greater than 0".to_string()
        ));
    }

    if config.backend == BallotBackend::Redis && redis.url.is_empty() {
        return Err(VoteDeskError::Config(
            "Redis URL is required for the redis ballot backend".to_string()
        ));
    }

    Ok(())
}

/// Validate verification gateway configuration
fn validate_verification_config(config: &super::VerificationConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(VoteDeskError::Config(
            "Verification API URL is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(VoteDeskError::Config(
            "Verification timeout must be greater than 0".to_string()
        ));
    }

    if config.attempts_per_minute == 0 {
        return Err(VoteDeskError::Config(
            "Verification attempts per minute must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_reporting_config(config: &super::ReportingConfig) -> Result<()> {
    if config.recent_votes_default <= 0 || config.recent_votes_max <= 0 || config.audit_log_limit <= 0 {
        return Err(VoteDeskError::Config(
            "Reporting limits must be greater than 0".to_string()
        ));
    }

    if config.recent_votes_default > config.recent_votes_max {
        return Err(VoteDeskError::Config(
            "Default recent votes limit cannot exceed the maximum".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(VoteDeskError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(VoteDeskError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if config.directory.is_empty() {
        return Err(VoteDeskError::Config(
            "Log directory is required".to_string()
        ));
    }

    Ok(())
}
