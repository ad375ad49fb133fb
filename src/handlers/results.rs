//! Results display endpoints

use axum::extract::{Query, State};
use axum::extract::rejection::QueryRejection;
use axum::Json;
use serde::Deserialize;
use crate::app::AppState;
use crate::models::{AuditEntry, ElectionData, RecentVote};
use crate::utils::errors::{Result, VoteDeskError};

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

fn limit_from(query: std::result::Result<Query<LimitQuery>, QueryRejection>) -> Result<Option<i64>> {
    let Query(query) = query.map_err(|_| VoteDeskError::Validation("limit must be an integer".to_string()))?;
    Ok(query.limit)
}

/// `GET /api/election-data`
pub async fn election_data(State(state): State<AppState>) -> Result<Json<ElectionData>> {
    Ok(Json(state.reporting.get_election_data().await?))
}

/// `GET /api/recent-votes?limit=`
pub async fn recent_votes(
    State(state): State<AppState>,
    query: std::result::Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Vec<RecentVote>>> {
    let limit = limit_from(query)?;
    Ok(Json(state.reporting.get_recent_votes(limit).await?))
}

/// `GET /api/audit-log?limit=`
pub async fn audit_log(
    State(state): State<AppState>,
    query: std::result::Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Vec<AuditEntry>>> {
    let limit = limit_from(query)?;
    Ok(Json(state.reporting.get_audit_log(limit).await?))
}
