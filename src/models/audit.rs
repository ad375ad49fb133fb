//! Audit log model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A write-once record of a verification or voting event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AuditEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    pub details: Option<String>,
    pub source_ip: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    VoterVerified,
    VerificationRejected,
    VerificationFailed,
    VoteCast,
    VoteRejected,
    SessionCreated,
    SessionActivated,
    PositionCreated,
    CandidateCreated,
    VoterRegistered,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::VoterVerified => "VOTER_VERIFIED",
            AuditAction::VerificationRejected => "VERIFICATION_REJECTED",
            AuditAction::VerificationFailed => "VERIFICATION_FAILED",
            AuditAction::VoteCast => "VOTE_CAST",
            AuditAction::VoteRejected => "VOTE_REJECTED",
            AuditAction::SessionCreated => "SESSION_CREATED",
            AuditAction::SessionActivated => "SESSION_ACTIVATED",
            AuditAction::PositionCreated => "POSITION_CREATED",
            AuditAction::CandidateCreated => "CANDIDATE_CREATED",
            AuditAction::VoterRegistered => "VOTER_REGISTERED",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor: String,
    pub action: AuditAction,
    pub details: Option<String>,
    pub source_ip: Option<String>,
}

impl NewAuditEntry {
    pub fn new(actor: impl Into<String>, action: AuditAction) -> Self {
        Self {
            actor: actor.into(),
            action,
            details: None,
            source_ip: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source_ip(mut self, source_ip: Option<String>) -> Self {
        self.source_ip = source_ip;
        self
    }
}

/// Actor label used for a voter in audit entries
pub fn voter_actor(voter_id: i64) -> String {
    format!("voter:{}", voter_id)
}
