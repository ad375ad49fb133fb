//! Voter repository implementation

use sqlx::{PgExecutor, PgPool};
use chrono::Utc;
use crate::models::voter::{Voter, RegisterVoterRequest};
use crate::utils::errors::VoteDeskError;

#[derive(Clone)]
pub struct VoterRepository {
    pool: PgPool,
}

impl VoterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new voter
    pub async fn register(&self, request: RegisterVoterRequest) -> Result<Voter, VoteDeskError> {
        let voter = sqlx::query_as::<_, Voter>(
            r#"
            INSERT INTO voters (name, grade, registered_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, grade, registered_at
            "#
        )
        .bind(request.name)
        .bind(request.grade)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(voter)
    }

    /// List voters, most recently registered first
    pub async fn list(&self) -> Result<Vec<Voter>, VoteDeskError> {
        let voters = sqlx::query_as::<_, Voter>(
            "SELECT id, name, grade, registered_at FROM voters ORDER BY registered_at DESC, id DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(voters)
    }

    /// Find voter by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Voter>, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let voter = sqlx::query_as::<_, Voter>(
            "SELECT id, name, grade, registered_at FROM voters WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(voter)
    }

    /// Find voter by ID on the repository's pool
    pub async fn get(&self, id: i64) -> Result<Option<Voter>, VoteDeskError> {
        Self::find_by_id(&self.pool, id).await
    }

    /// Count registered voters
    pub async fn count<'e, E>(executor: E) -> Result<i64, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM voters")
            .fetch_one(executor)
            .await?;

        Ok(count.0)
    }

    /// Count voters with at least one vote in the session
    pub async fn count_voted_in_session<'e, E>(executor: E, session_id: i64) -> Result<i64, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT voter_id) FROM votes WHERE session_id = $1"
        )
        .bind(session_id)
        .fetch_one(executor)
        .await?;

        Ok(count.0)
    }

    /// Positions of the session the voter has not voted for yet, in ballot order
    pub async fn remaining_position_ids(&self, voter_id: i64, session_id: i64) -> Result<Vec<i64>, VoteDeskError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT p.id
            FROM positions p
            WHERE p.session_id = $2
              AND NOT EXISTS (
                  SELECT 1 FROM votes v
                  WHERE v.position_id = p.id AND v.session_id = p.session_id AND v.voter_id = $1
              )
            ORDER BY p.display_order ASC, p.id ASC
            "#
        )
        .bind(voter_id)
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
