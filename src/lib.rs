//! VoteDesk
//!
//! Live election tally and vote-casting service for school elections.
//! Verified voters cast one vote per position through a ballot token, and
//! the results display polls live per-candidate counts and turnout.

#![allow(non_snake_case)]

pub mod app;
pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod utils;
pub mod middleware;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{VoteDeskError, ErrorKind, Result};

// Re-export main components for easy access
pub use app::{AppState, build_router, serve};
pub use database::DatabaseService;
pub use services::{TallyEngine, VotingService, VerificationService, ReportingService};
pub use state::{BallotStore, MemoryBallotStore, RedisBallotStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
