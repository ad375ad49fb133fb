//! Read-side composition for the results display and the voting client

use tracing::debug;
use crate::config::ReportingConfig;
use crate::database::{DatabaseService, PositionRepository};
use crate::models::{AuditEntry, Candidate, ElectionData, Position, RecentVote};
use crate::services::tally::TallyEngine;
use crate::utils::errors::{Result, VoteDeskError};
use crate::utils::helpers::clamp_limit;

#[derive(Clone)]
pub struct ReportingService {
    database: DatabaseService,
    tally: TallyEngine,
    config: ReportingConfig,
}

impl ReportingService {
    pub fn new(database: DatabaseService, tally: TallyEngine, config: ReportingConfig) -> Self {
        Self { database, tally, config }
    }

    /// Live results; an explicit empty shape when nothing is running
    pub async fn get_election_data(&self) -> Result<ElectionData> {
        match self.tally.compute_active_snapshot().await {
            Ok(snapshot) => Ok(snapshot.into()),
            Err(VoteDeskError::NoActiveSession) => Ok(ElectionData::inactive()),
            Err(e) => Err(e),
        }
    }

    /// Latest votes of the active session, newest first
    pub async fn get_recent_votes(&self, limit: Option<i64>) -> Result<Vec<RecentVote>> {
        let limit = clamp_limit(limit, self.config.recent_votes_default, self.config.recent_votes_max);

        let Some(session) = self.database.sessions.active().await? else {
            debug!("No active session, recent votes feed is empty");
            return Ok(Vec::new());
        };

        self.database.votes.recent(session.id, limit).await
    }

    pub async fn get_audit_log(&self, limit: Option<i64>) -> Result<Vec<AuditEntry>> {
        let limit = clamp_limit(limit, self.config.audit_log_limit, self.config.audit_log_limit);
        self.database.audit.recent(limit).await
    }

    /// Positions on the active ballot, in display order
    pub async fn list_positions(&self) -> Result<Vec<Position>> {
        let session = self.database.sessions.active().await?.ok_or(VoteDeskError::NoActiveSession)?;
        self.database.positions.for_session(session.id).await
    }

    /// Candidates standing for a position of the active ballot
    pub async fn list_candidates(&self, position_id: Option<i64>) -> Result<Vec<Candidate>> {
        let position_id = position_id
            .ok_or_else(|| VoteDeskError::Validation("position_id is required".to_string()))?;

        let session = self.database.sessions.active().await?.ok_or(VoteDeskError::NoActiveSession)?;
        if PositionRepository::find_in_session(self.database.pool(), position_id, session.id).await?.is_none() {
            return Err(VoteDeskError::Validation(format!(
                "Position {} is not part of the active election",
                position_id
            )));
        }

        self.database.candidates.list_for_position(position_id).await
    }
}
