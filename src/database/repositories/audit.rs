//! Audit log repository implementation
//!
//! The audit log is append-only: there is no update or delete path here, and
//! the schema rejects both.

use sqlx::{PgExecutor, PgPool};
use chrono::Utc;
use crate::models::audit::{AuditEntry, NewAuditEntry};
use crate::utils::errors::VoteDeskError;

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry
    pub async fn append<'e, E>(executor: E, entry: &NewAuditEntry) -> Result<AuditEntry, VoteDeskError>
    where
        E: PgExecutor<'e>,
    {
        let entry = sqlx::query_as::<_, AuditEntry>(
            r#"
            INSERT INTO audit_log (created_at, actor, action, details, source_ip)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at, actor, action, details, source_ip
            "#
        )
        .bind(Utc::now())
        .bind(&entry.actor)
        .bind(entry.action.as_str())
        .bind(entry.details.as_deref())
        .bind(entry.source_ip.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    /// Append an entry on the repository's pool
    pub async fn record(&self, entry: &NewAuditEntry) -> Result<AuditEntry, VoteDeskError> {
        Self::append(&self.pool, entry).await
    }

    /// Most recent entries, newest first
    pub async fn recent(&self, limit: i64) -> Result<Vec<AuditEntry>, VoteDeskError> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            "SELECT id, created_at, actor, action, details, source_ip FROM audit_log ORDER BY created_at DESC, id DESC LIMIT $1"
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
