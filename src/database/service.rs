//! Database service layer
//!
//! This module provides a high-level interface to database operations,
//! including the election administration operations that set up sessions,
//! ballots and the voter roll.

use crate::database::{
    DatabasePool, SessionRepository, PositionRepository, CandidateRepository, VoterRepository,
    VoteRepository, AuditRepository,
};
use crate::models::*;
use crate::utils::errors::VoteDeskError;

#[derive(Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub sessions: SessionRepository,
    pub positions: PositionRepository,
    pub candidates: CandidateRepository,
    pub voters: VoterRepository,
    pub votes: VoteRepository,
    pub audit: AuditRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            sessions: SessionRepository::new(pool.clone()),
            positions: PositionRepository::new(pool.clone()),
            candidates: CandidateRepository::new(pool.clone()),
            voters: VoterRepository::new(pool.clone()),
            votes: VoteRepository::new(pool.clone()),
            audit: AuditRepository::new(pool.clone()),
            pool,
        }
    }

    /// Shared connection pool
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Check that the store answers
    pub async fn health_check(&self) -> Result<(), VoteDeskError> {
        super::connection::health_check(&self.pool).await
    }

    /// Create a new election session
    pub async fn create_session(&self, request: CreateSessionRequest, source_ip: Option<String>) -> Result<Session, VoteDeskError> {
        require_text("name", &request.name)?;
        require_text("academic_year", &request.academic_year)?;

        let session = self.sessions.create(request).await.map_err(|e| conflict_as_validation(e, "A session with this name already exists"))?;

        let entry = NewAuditEntry::new("admin", AuditAction::SessionCreated)
            .with_details(format!("New session: {}", session.name))
            .with_source_ip(source_ip);
        self.audit.record(&entry).await?;

        Ok(session)
    }

    /// Activate a session, deactivating any other
    pub async fn activate_session(&self, session_id: i64, source_ip: Option<String>) -> Result<Session, VoteDeskError> {
        let session = self
            .sessions
            .activate(session_id)
            .await?
            .ok_or_else(|| VoteDeskError::Validation(format!("Session {} does not exist", session_id)))?;

        let entry = NewAuditEntry::new("admin", AuditAction::SessionActivated)
            .with_details(format!("Session activated: {}", session.name))
            .with_source_ip(source_ip);
        self.audit.record(&entry).await?;

        Ok(session)
    }

    /// Add a position to a session
    pub async fn create_position(&self, request: CreatePositionRequest, source_ip: Option<String>) -> Result<Position, VoteDeskError> {
        require_text("name", &request.name)?;
        if self.sessions.find_by_id(request.session_id).await?.is_none() {
            return Err(VoteDeskError::Validation(format!("Session {} does not exist", request.session_id)));
        }

        let position = self.positions.create(request).await.map_err(|e| conflict_as_validation(e, "Position already exists in this session"))?;

        let entry = NewAuditEntry::new("admin", AuditAction::PositionCreated)
            .with_details(format!("New position: {} (session {})", position.name, position.session_id))
            .with_source_ip(source_ip);
        self.audit.record(&entry).await?;

        Ok(position)
    }

    /// Add a candidate to a position
    pub async fn create_candidate(&self, request: CreateCandidateRequest, source_ip: Option<String>) -> Result<Candidate, VoteDeskError> {
        require_text("name", &request.name)?;

        let candidate = self.candidates.create(request).await?;

        let entry = NewAuditEntry::new("admin", AuditAction::CandidateCreated)
            .with_details(format!("New candidate: {} (position {})", candidate.name, candidate.position_id))
            .with_source_ip(source_ip);
        self.audit.record(&entry).await?;

        Ok(candidate)
    }

    /// Add a voter to the roll
    pub async fn register_voter(&self, request: RegisterVoterRequest, source_ip: Option<String>) -> Result<Voter, VoteDeskError> {
        require_text("name", &request.name)?;
        require_text("grade", &request.grade)?;

        let voter = self.voters.register(request).await?;

        let entry = NewAuditEntry::new("admin", AuditAction::VoterRegistered)
            .with_details(format!("New voter: {} ({})", voter.name, voter.grade))
            .with_source_ip(source_ip);
        self.audit.record(&entry).await?;

        Ok(voter)
    }
}

fn require_text(field: &str, value: &str) -> Result<(), VoteDeskError> {
    if value.trim().is_empty() {
        return Err(VoteDeskError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn conflict_as_validation(err: VoteDeskError, message: &str) -> VoteDeskError {
    match err {
        VoteDeskError::Database(sqlx::Error::Database(ref db)) if db.is_unique_violation() => {
            VoteDeskError::Validation(message.to_string())
        }
        other => other,
    }
}
