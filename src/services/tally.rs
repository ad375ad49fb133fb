//! Tally engine
//!
//! Computes live per-candidate counts, per-position totals, percentages and
//! global turnout for a session. Every call reads the store afresh; nothing is
//! cached between calls.

use std::collections::HashMap;
use std::time::Instant;
use chrono::{DateTime, Utc};
use tracing::debug;
use crate::database::{
    CandidateRepository, DatabasePool, PositionRepository, SessionRepository, VoterRepository,
};
use crate::models::tally::CandidateTally;
use crate::models::{CandidateResult, ElectionSnapshot, ElectionStatistics, Position, PositionResult, Session};
use crate::utils::errors::{Result, VoteDeskError};
use crate::utils::helpers::percentage;
use crate::utils::logging;

#[derive(Clone)]
pub struct TallyEngine {
    pool: DatabasePool,
}

impl TallyEngine {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Snapshot of the currently active session
    pub async fn compute_active_snapshot(&self) -> Result<ElectionSnapshot> {
        let session = SessionRepository::find_active(&self.pool)
            .await?
            .ok_or(VoteDeskError::NoActiveSession)?;

        self.compute_snapshot(session.id).await
    }

    /// Snapshot of the given session, which must be active.
    ///
    /// All reads happen in one repeatable-read transaction so the counts,
    /// totals and turnout agree with each other.
    pub async fn compute_snapshot(&self, session_id: i64) -> Result<ElectionSnapshot> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let session = match SessionRepository::find_if_active(&mut *tx, session_id).await? {
            Some(session) => session,
            None => {
                tx.rollback().await?;
                return Err(VoteDeskError::NoActiveSession);
            }
        };

        let positions = PositionRepository::list_for_session(&mut *tx, session_id).await?;
        let tallies = CandidateRepository::tallies_for_session(&mut *tx, session_id).await?;
        let total_voters = VoterRepository::count(&mut *tx).await?;
        let voted_voters = VoterRepository::count_voted_in_session(&mut *tx, session_id).await?;

        tx.commit().await?;

        logging::log_database_operation(
            "compute_snapshot",
            "votes",
            started.elapsed().as_millis() as u64,
            true,
        );

        let snapshot = build_snapshot(session, positions, tallies, total_voters, voted_voters, Utc::now());
        debug!(
            session_id = session_id,
            positions = snapshot.positions.len(),
            total_votes = snapshot.statistics.total_votes,
            "Election snapshot computed"
        );

        Ok(snapshot)
    }
}

/// Assemble a snapshot from raw store rows.
///
/// Positions keep the order they are given in. Candidates are ranked by vote
/// count descending, then name ascending, then id ascending.
pub fn build_snapshot(
    session: Session,
    positions: Vec<Position>,
    tallies: Vec<CandidateTally>,
    total_voters: i64,
    voted_voters: i64,
    computed_at: DateTime<Utc>,
) -> ElectionSnapshot {
    let mut by_position: HashMap<i64, Vec<CandidateTally>> = HashMap::new();
    for tally in tallies {
        by_position.entry(tally.candidate.position_id).or_default().push(tally);
    }

    let positions: Vec<PositionResult> = positions
        .into_iter()
        .map(|position| {
            let tallies = by_position.remove(&position.id).unwrap_or_default();
            tally_position(position, tallies, total_voters)
        })
        .collect();

    let total_votes: i64 = positions.iter().map(|p| p.total_votes).sum();

    ElectionSnapshot {
        session,
        positions,
        statistics: ElectionStatistics {
            total_voters,
            voted_voters,
            total_votes,
            turnout_percentage: percentage(voted_voters, total_voters),
        },
        computed_at,
    }
}

fn tally_position(position: Position, mut tallies: Vec<CandidateTally>, total_voters: i64) -> PositionResult {
    tallies.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then_with(|| a.candidate.name.cmp(&b.candidate.name))
            .then_with(|| a.candidate.id.cmp(&b.candidate.id))
    });

    let total_votes: i64 = tallies.iter().map(|t| t.vote_count).sum();

    let candidates = tallies
        .into_iter()
        .map(|tally| CandidateResult {
            percentage: percentage(tally.vote_count, total_votes),
            vote_count: tally.vote_count,
            candidate: tally.candidate,
        })
        .collect();

    PositionResult {
        position,
        total_voters,
        votes_cast: total_votes,
        candidates,
        total_votes,
    }
}
