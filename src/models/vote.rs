//! Vote log model and vote-casting outcomes

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::ErrorKind;

/// One accepted vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VoteRecord {
    pub id: i64,
    pub session_id: i64,
    pub position_id: i64,
    pub candidate_id: i64,
    pub voter_id: i64,
    pub cast_at: DateTime<Utc>,
    pub source_ip: Option<String>,
}

/// A vote joined with the names shown on the live results feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentVote {
    pub timestamp: DateTime<Utc>,
    pub voter_name: String,
    pub voter_grade: String,
    pub candidate_name: String,
    pub position_name: String,
}

/// Body of `POST /api/vote`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastVoteRequest {
    pub candidate_id: Option<i64>,
    pub position_id: Option<i64>,
}

/// Result of a vote attempt that reached the store
#[derive(Debug, Clone, PartialEq)]
pub enum VoteOutcome {
    Accepted(VoteReceipt),
    Rejected(RejectionReason),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteReceipt {
    pub vote_id: i64,
    pub session_id: i64,
    pub position_id: i64,
    pub candidate_id: i64,
    pub voter_id: i64,
    pub cast_at: DateTime<Utc>,
}

/// Why a vote was refused, in the order the preconditions are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    NoActiveSession,
    InvalidPosition,
    InvalidCandidate,
    UnknownVoter,
    DuplicateVote,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::NoActiveSession => "NO_ACTIVE_SESSION",
            RejectionReason::InvalidPosition => "INVALID_POSITION",
            RejectionReason::InvalidCandidate => "INVALID_CANDIDATE",
            RejectionReason::UnknownVoter => "UNKNOWN_VOTER",
            RejectionReason::DuplicateVote => "DUPLICATE_VOTE",
        }
    }

    /// Message shown to the voting client
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::NoActiveSession => "No election is currently running",
            RejectionReason::InvalidPosition => "Position is not part of the active election",
            RejectionReason::InvalidCandidate => "Candidate is not standing for this position",
            RejectionReason::UnknownVoter => "Voter is not registered",
            RejectionReason::DuplicateVote => "You have already voted for this position",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RejectionReason::NoActiveSession => ErrorKind::NoActiveSession,
            RejectionReason::InvalidPosition
            | RejectionReason::InvalidCandidate
            | RejectionReason::UnknownVoter => ErrorKind::Validation,
            RejectionReason::DuplicateVote => ErrorKind::DuplicateVote,
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
