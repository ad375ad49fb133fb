//! Voter model
//!
//! Whether a voter has voted is not stored on the voter. It is derived per
//! position from the vote log, since a voter casts one vote per position.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Voter {
    pub id: i64,
    pub name: String,
    pub grade: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterVoterRequest {
    pub name: String,
    pub grade: String,
}
