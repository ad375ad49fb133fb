//! Position repository implementation

use sqlx::{PgExecutor, PgPool};
use crate::models::position::{Position, CreatePositionRequest};
use crate::utils::errors::VoteDeskError;

#[derive(Clone)]
pub struct PositionRepository {
    pool: PgPool,
}

impl PositionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new position in a session
    pub async fn create(&self, request: CreatePositionRequest) -> Result<Position, VoteDeskError> {
        let position = sqlx::query_as::<_, Position>(
            r#"
            INSERT INTO positions (session_id, name, description, display_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, session_id, name, description, display_order
            "#
        )
        .bind(request.session_id)
        .bind(request.name)
        .bind(request.description)
        .bind(request.display_order.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;

        Ok(position)
    }

    /// Positions of a session in ballot order
    pub async fn list_for_session<'e, E>(executor: E, session_id: i64) -> Result<Vec<Position>, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let positions = sqlx::query_as::<_, Position>(
            "SELECT id, session_id, name, description, display_order FROM positions WHERE session_id = $1 ORDER BY display_order ASC, id ASC"
        )
        .bind(session_id)
        .fetch_all(executor)
        .await?;

        Ok(positions)
    }

    /// Positions of a session on the repository's pool
    pub async fn for_session(&self, session_id: i64) -> Result<Vec<Position>, VoteDeskError> {
        Self::list_for_session(&self.pool, session_id).await
    }

    /// Find a position only if it belongs to the given session
    pub async fn find_in_session<'e, E>(executor: E, position_id: i64, session_id: i64) -> Result<Option<Position>, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let position = sqlx::query_as::<_, Position>(
            "SELECT id, session_id, name, description, display_order FROM positions WHERE id = $1 AND session_id = $2"
        )
        .bind(position_id)
        .bind(session_id)
        .fetch_optional(executor)
        .await?;

        Ok(position)
    }
}
