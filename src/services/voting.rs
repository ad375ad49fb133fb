//! Vote-casting service
//!
//! Records one vote per voter per position. The precondition checks and the
//! insert run in a single transaction, and the insert itself is guarded by the
//! `(session_id, position_id, voter_id)` uniqueness constraint, so concurrent
//! attempts for the same slot resolve to exactly one accepted vote.

use chrono::Utc;
use sqlx::PgConnection;
use tracing::debug;
use crate::database::{
    AuditRepository, CandidateRepository, DatabasePool, NewVote, PositionRepository,
    SessionRepository, VoteRepository, VoterRepository,
};
use crate::models::audit::{voter_actor, AuditAction, NewAuditEntry};
use crate::models::{RejectionReason, VoteOutcome, VoteReceipt};
use crate::utils::errors::{Result, VoteDeskError};
use crate::utils::logging;

/// A single vote attempt
#[derive(Debug, Clone)]
pub struct Ballot {
    pub session_id: i64,
    pub position_id: i64,
    pub voter_id: i64,
    pub candidate_id: i64,
    pub source_ip: Option<String>,
}

#[derive(Clone)]
pub struct VotingService {
    pool: DatabasePool,
}

impl VotingService {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Validate and record a vote.
    ///
    /// Business-rule failures come back as `VoteOutcome::Rejected`; `Err` is
    /// reserved for store failures. The transaction is rolled back on every
    /// path that does not commit.
    pub async fn cast_vote(&self, ballot: Ballot) -> Result<VoteOutcome> {
        let mut tx = self.pool.begin().await?;

        if let Some(reason) = check_preconditions(&mut tx, &ballot).await? {
            tx.rollback().await?;
            self.record_rejection(&ballot, reason).await?;
            return Ok(VoteOutcome::Rejected(reason));
        }

        let vote = NewVote {
            session_id: ballot.session_id,
            position_id: ballot.position_id,
            candidate_id: ballot.candidate_id,
            voter_id: ballot.voter_id,
            cast_at: Utc::now(),
            source_ip: ballot.source_ip.clone(),
        };

        let inserted = match VoteRepository::insert_unique(&mut *tx, &vote).await {
            Ok(record) => record,
            Err(VoteDeskError::Database(sqlx::Error::Database(ref db))) if db.is_unique_violation() => None,
            Err(e) => return Err(e),
        };

        let Some(record) = inserted else {
            tx.rollback().await?;
            self.record_rejection(&ballot, RejectionReason::DuplicateVote).await?;
            return Ok(VoteOutcome::Rejected(RejectionReason::DuplicateVote));
        };

        let entry = NewAuditEntry::new(voter_actor(ballot.voter_id), AuditAction::VoteCast)
            .with_details(format!(
                "Voter {} voted for candidate {} (position {})",
                ballot.voter_id, ballot.candidate_id, ballot.position_id
            ))
            .with_source_ip(ballot.source_ip.clone());
        AuditRepository::append(&mut *tx, &entry).await?;

        tx.commit().await?;

        logging::log_vote_cast(record.session_id, record.position_id, record.candidate_id, record.voter_id);

        Ok(VoteOutcome::Accepted(VoteReceipt {
            vote_id: record.id,
            session_id: record.session_id,
            position_id: record.position_id,
            candidate_id: record.candidate_id,
            voter_id: record.voter_id,
            cast_at: record.cast_at,
        }))
    }

    /// Cast a vote in whichever session is active right now
    pub async fn cast_vote_in_active_session(
        &self,
        position_id: i64,
        voter_id: i64,
        candidate_id: i64,
        source_ip: Option<String>,
    ) -> Result<VoteOutcome> {
        let Some(session) = SessionRepository::find_active(&self.pool).await? else {
            let ballot = Ballot { session_id: 0, position_id, voter_id, candidate_id, source_ip };
            self.record_rejection(&ballot, RejectionReason::NoActiveSession).await?;
            return Ok(VoteOutcome::Rejected(RejectionReason::NoActiveSession));
        };

        self.cast_vote(Ballot {
            session_id: session.id,
            position_id,
            voter_id,
            candidate_id,
            source_ip,
        })
        .await
    }

    async fn record_rejection(&self, ballot: &Ballot, reason: RejectionReason) -> Result<()> {
        logging::log_vote_rejected(ballot.position_id, ballot.candidate_id, ballot.voter_id, reason.as_str());

        let entry = NewAuditEntry::new(voter_actor(ballot.voter_id), AuditAction::VoteRejected)
            .with_details(format!(
                "Vote by voter {} for candidate {} (position {}) rejected: {}",
                ballot.voter_id, ballot.candidate_id, ballot.position_id, reason
            ))
            .with_source_ip(ballot.source_ip.clone());
        AuditRepository::append(&self.pool, &entry).await?;

        Ok(())
    }
}

/// Run the checks in their fixed order and return the first failure.
///
/// The active session row is share-locked for the rest of the transaction.
async fn check_preconditions(conn: &mut PgConnection, ballot: &Ballot) -> Result<Option<RejectionReason>> {
    if SessionRepository::lock_if_active(&mut *conn, ballot.session_id).await?.is_none() {
        return Ok(Some(RejectionReason::NoActiveSession));
    }

    if PositionRepository::find_in_session(&mut *conn, ballot.position_id, ballot.session_id).await?.is_none() {
        return Ok(Some(RejectionReason::InvalidPosition));
    }

    if CandidateRepository::find_for_position(&mut *conn, ballot.candidate_id, ballot.position_id).await?.is_none() {
        return Ok(Some(RejectionReason::InvalidCandidate));
    }

    if VoterRepository::find_by_id(&mut *conn, ballot.voter_id).await?.is_none() {
        return Ok(Some(RejectionReason::UnknownVoter));
    }

    debug!(
        session_id = ballot.session_id,
        position_id = ballot.position_id,
        voter_id = ballot.voter_id,
        "Vote preconditions satisfied"
    );
    Ok(None)
}
