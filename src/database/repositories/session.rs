//! Session repository implementation

use sqlx::{PgExecutor, PgPool};
use chrono::Utc;
use crate::models::session::{Session, CreateSessionRequest};
use crate::utils::errors::VoteDeskError;

const SESSION_COLUMNS: &str = "id, name, academic_year, description, is_active, created_at";

#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new, inactive session
    pub async fn create(&self, request: CreateSessionRequest) -> Result<Session, VoteDeskError> {
        let session = sqlx::query_as::<_, Session>(&format!(
            r#"
            INSERT INTO sessions (name, academic_year, description, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(request.name)
        .bind(request.academic_year)
        .bind(request.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Find session by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Session>, VoteDeskError> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// List sessions, newest first
    pub async fn list(&self) -> Result<Vec<Session>, VoteDeskError> {
        let sessions = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Get the active session, if any
    pub async fn find_active<'e, E>(executor: E) -> Result<Option<Session>, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE is_active = TRUE LIMIT 1"
        ))
        .fetch_optional(executor)
        .await?;

        Ok(session)
    }

    /// Get the active session on the repository's pool
    pub async fn active(&self) -> Result<Option<Session>, VoteDeskError> {
        Self::find_active(&self.pool).await
    }

    /// Load a session only if it is active
    pub async fn find_if_active<'e, E>(executor: E, id: i64) -> Result<Option<Session>, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(session)
    }

    /// Load a session only if it is active, holding a share lock on the row
    /// so it cannot be deactivated before the caller's transaction ends
    pub async fn lock_if_active<'e, E>(executor: E, id: i64) -> Result<Option<Session>, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1 AND is_active = TRUE FOR SHARE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(session)
    }

    /// Make the given session the only active one
    pub async fn activate(&self, id: i64) -> Result<Option<Session>, VoteDeskError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE sessions SET is_active = FALSE WHERE is_active = TRUE AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let session = sqlx::query_as::<_, Session>(&format!(
            "UPDATE sessions SET is_active = TRUE WHERE id = $1 RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                VoteDeskError::Unavailable("Another session was activated concurrently".to_string())
            }
            other => VoteDeskError::Database(other),
        })?;

        if session.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(session)
    }
}
