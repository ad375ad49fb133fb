//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod session;
pub mod position;
pub mod voter;
pub mod vote;
pub mod audit;
pub mod tally;

// Re-export commonly used models
pub use session::{Session, CreateSessionRequest};
pub use position::{Position, Candidate, CreatePositionRequest, CreateCandidateRequest};
pub use voter::{Voter, RegisterVoterRequest};
pub use vote::{VoteRecord, RecentVote, CastVoteRequest, VoteOutcome, VoteReceipt, RejectionReason};
pub use audit::{AuditEntry, AuditAction, NewAuditEntry};
pub use tally::{ElectionSnapshot, PositionResult, CandidateResult, ElectionStatistics, ElectionData};
