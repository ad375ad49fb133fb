//! Candidate repository implementation

use sqlx::{PgExecutor, PgPool};
use crate::models::position::{Candidate, CreateCandidateRequest};
use crate::models::tally::CandidateTally;
use crate::utils::errors::VoteDeskError;

#[derive(Clone)]
pub struct CandidateRepository {
    pool: PgPool,
}

impl CandidateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a candidate for a position
    pub async fn create(&self, request: CreateCandidateRequest) -> Result<Candidate, VoteDeskError> {
        let candidate = sqlx::query_as::<_, Candidate>(
            r#"
            INSERT INTO candidates (position_id, name, grade, manifesto, photo_filename)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, position_id, name, grade, manifesto, photo_filename
            "#
        )
        .bind(request.position_id)
        .bind(request.name)
        .bind(request.grade)
        .bind(request.manifesto)
        .bind(request.photo_filename)
        .fetch_one(&self.pool)
        .await?;

        Ok(candidate)
    }

    /// Candidates standing for a position
    pub async fn list_for_position(&self, position_id: i64) -> Result<Vec<Candidate>, VoteDeskError> {
        let candidates = sqlx::query_as::<_, Candidate>(
            "SELECT id, position_id, name, grade, manifesto, photo_filename FROM candidates WHERE position_id = $1 ORDER BY name ASC, id ASC"
        )
        .bind(position_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    /// Find a candidate only if it stands for the given position
    pub async fn find_for_position<'e, E>(executor: E, candidate_id: i64, position_id: i64) -> Result<Option<Candidate>, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let candidate = sqlx::query_as::<_, Candidate>(
            "SELECT id, position_id, name, grade, manifesto, photo_filename FROM candidates WHERE id = $1 AND position_id = $2"
        )
        .bind(candidate_id)
        .bind(position_id)
        .fetch_optional(executor)
        .await?;

        Ok(candidate)
    }

    /// Every candidate of a session with the votes recorded for them in it
    pub async fn tallies_for_session<'e, E>(executor: E, session_id: i64) -> Result<Vec<CandidateTally>, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let tallies = sqlx::query_as::<_, CandidateTally>(
            r#"
            SELECT c.id, c.position_id, c.name, c.grade, c.manifesto, c.photo_filename,
                   COUNT(v.id) AS vote_count
            FROM candidates c
            INNER JOIN positions p ON p.id = c.position_id
            LEFT JOIN votes v ON v.candidate_id = c.id AND v.session_id = p.session_id
            WHERE p.session_id = $1
            GROUP BY c.id
            ORDER BY c.position_id ASC, c.id ASC
            "#
        )
        .bind(session_id)
        .fetch_all(executor)
        .await?;

        Ok(tallies)
    }
}
