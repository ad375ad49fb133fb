//! Tally and reporting views

use serde::{Serialize, Serializer};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::{Candidate, Position, Session};

/// A candidate row joined with its vote count for one session
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CandidateTally {
    #[sqlx(flatten)]
    pub candidate: Candidate,
    pub vote_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateResult {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub vote_count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionResult {
    #[serde(flatten)]
    pub position: Position,
    pub total_voters: i64,
    pub votes_cast: i64,
    pub candidates: Vec<CandidateResult>,
    pub total_votes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectionStatistics {
    pub total_voters: i64,
    pub voted_voters: i64,
    pub total_votes: i64,
    pub turnout_percentage: f64,
}

/// Live tally of one session, recomputed on every request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectionSnapshot {
    pub session: Session,
    pub positions: Vec<PositionResult>,
    pub statistics: ElectionStatistics,
    pub computed_at: DateTime<Utc>,
}

/// Response body of `GET /api/election-data`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionData {
    pub active_session: Option<Session>,
    pub positions: Vec<PositionResult>,
    #[serde(serialize_with = "empty_object_when_none")]
    pub statistics: Option<ElectionStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ElectionData {
    /// Body returned while no session is active
    pub fn inactive() -> Self {
        Self {
            active_session: None,
            positions: Vec::new(),
            statistics: None,
            last_updated: None,
        }
    }
}

impl From<ElectionSnapshot> for ElectionData {
    fn from(snapshot: ElectionSnapshot) -> Self {
        Self {
            active_session: Some(snapshot.session),
            positions: snapshot.positions,
            statistics: Some(snapshot.statistics),
            last_updated: Some(snapshot.computed_at),
        }
    }
}

fn empty_object_when_none<S>(
    statistics: &Option<ElectionStatistics>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::SerializeMap;

    match statistics {
        Some(statistics) => statistics.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
