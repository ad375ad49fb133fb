//! Position and candidate models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An electable office within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: i64,
    pub session_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: i64,
    pub position_id: i64,
    pub name: String,
    pub grade: Option<String>,
    pub manifesto: Option<String>,
    pub photo_filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePositionRequest {
    pub session_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCandidateRequest {
    pub position_id: i64,
    pub name: String,
    pub grade: Option<String>,
    pub manifesto: Option<String>,
    pub photo_filename: Option<String>,
}
