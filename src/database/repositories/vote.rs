//! Vote log repository implementation

use sqlx::{PgExecutor, PgPool};
use chrono::{DateTime, Utc};
use crate::models::vote::{VoteRecord, RecentVote};
use crate::utils::errors::VoteDeskError;

/// A vote about to be appended to the log
#[derive(Debug, Clone)]
pub struct NewVote {
    pub session_id: i64,
    pub position_id: i64,
    pub candidate_id: i64,
    pub voter_id: i64,
    pub cast_at: DateTime<Utc>,
    pub source_ip: Option<String>,
}

#[derive(Clone)]
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a vote unless the voter already has one for the position in
    /// the session. Returns `None` when the uniqueness constraint rejected it.
    pub async fn insert_unique<'e, E>(executor: E, vote: &NewVote) -> Result<Option<VoteRecord>, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, VoteRecord>(
            r#"
            INSERT INTO votes (session_id, position_id, candidate_id, voter_id, cast_at, source_ip)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT ON CONSTRAINT votes_one_per_position DO NOTHING
            RETURNING id, session_id, position_id, candidate_id, voter_id, cast_at, source_ip
            "#
        )
        .bind(vote.session_id)
        .bind(vote.position_id)
        .bind(vote.candidate_id)
        .bind(vote.voter_id)
        .bind(vote.cast_at)
        .bind(vote.source_ip.as_deref())
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Votes matching one (session, position, voter) slot
    pub async fn count_for_voter_position(&self, session_id: i64, position_id: i64, voter_id: i64) -> Result<i64, VoteDeskError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM votes WHERE session_id = $1 AND position_id = $2 AND voter_id = $3"
        )
        .bind(session_id)
        .bind(position_id)
        .bind(voter_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Most recent votes of a session with display names, newest first
    pub async fn recent(&self, session_id: i64, limit: i64) -> Result<Vec<RecentVote>, VoteDeskError> {
        let votes = sqlx::query_as::<_, RecentVote>(
            r#"
            SELECT vl.cast_at AS timestamp,
                   v.name AS voter_name,
                   v.grade AS voter_grade,
                   c.name AS candidate_name,
                   p.name AS position_name
            FROM votes vl
            INNER JOIN voters v ON vl.voter_id = v.id
            INNER JOIN candidates c ON vl.candidate_id = c.id
            INNER JOIN positions p ON vl.position_id = p.id
            WHERE vl.session_id = $1
            ORDER BY vl.cast_at DESC, vl.id DESC
            LIMIT $2
            "#
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(votes)
    }
}
