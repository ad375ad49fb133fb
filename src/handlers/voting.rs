//! Voting client endpoints

use std::net::SocketAddr;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::app::{AppState, BALLOT_TOKEN_HEADER};
use super::json_body;
use crate::models::{CastVoteRequest, Candidate, Position, VoteOutcome};
use crate::services::{Ballot, VerifyVoterResult};
use crate::state::BallotStore;
use crate::utils::errors::{Result, VoteDeskError};

#[derive(Debug, Default, Deserialize)]
pub struct CandidatesQuery {
    pub position_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyVoterRequest {
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyVoterResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ballot_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_positions: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CastVoteResponse {
    pub status: &'static str,
    pub message: String,
    pub remaining_positions: Vec<i64>,
}

/// `GET /api/positions`
pub async fn list_positions(State(state): State<AppState>) -> Result<Json<Vec<Position>>> {
    Ok(Json(state.reporting.list_positions().await?))
}

/// `GET /api/candidates?position_id=`
pub async fn list_candidates(
    State(state): State<AppState>,
    query: std::result::Result<Query<CandidatesQuery>, QueryRejection>,
) -> Result<Json<Vec<Candidate>>> {
    let Query(query) =
        query.map_err(|_| VoteDeskError::Validation("position_id must be an integer".to_string()))?;
    Ok(Json(state.reporting.list_candidates(query.position_id).await?))
}

/// `POST /api/verify-voter`
pub async fn verify_voter(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    payload: std::result::Result<Json<VerifyVoterRequest>, JsonRejection>,
) -> Result<Json<VerifyVoterResponse>> {
    let request = json_body(payload)?;
    let image = request
        .image
        .filter(|image| !image.is_empty())
        .ok_or_else(|| VoteDeskError::Validation("No image provided".to_string()))?;

    let response = match state.verification.verify_voter(&image, Some(peer.ip().to_string())).await? {
        VerifyVoterResult::Verified(voter) => VerifyVoterResponse {
            status: "success",
            voter_name: Some(voter.voter_name),
            ballot_token: Some(voter.ballot_token),
            remaining_positions: Some(voter.remaining_positions),
            message: None,
        },
        VerifyVoterResult::Rejected(message) => VerifyVoterResponse {
            status: "error",
            voter_name: None,
            ballot_token: None,
            remaining_positions: None,
            message: Some(message),
        },
    };

    Ok(Json(response))
}

/// `POST /api/vote`
pub async fn cast_vote(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: std::result::Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<Json<CastVoteResponse>> {
    let token = headers
        .get(BALLOT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
        .ok_or(VoteDeskError::NotVerified)?
        .to_string();

    let ballot_session = state.ballots.resolve(&token).await?.ok_or(VoteDeskError::NotVerified)?;

    let request = json_body(payload)?;
    let (Some(candidate_id), Some(position_id)) = (request.candidate_id, request.position_id) else {
        return Err(VoteDeskError::Validation("candidate_id and position_id are required".to_string()));
    };

    let outcome = state
        .voting
        .cast_vote(Ballot {
            session_id: ballot_session.session_id,
            position_id,
            voter_id: ballot_session.voter_id,
            candidate_id,
            source_ip: Some(peer.ip().to_string()),
        })
        .await?;

    if let VoteOutcome::Rejected(reason) = outcome {
        return Err(VoteDeskError::VoteRejected(reason));
    }

    let remaining = state
        .database
        .voters
        .remaining_position_ids(ballot_session.voter_id, ballot_session.session_id)
        .await?;

    if remaining.is_empty() {
        debug!(voter_id = ballot_session.voter_id, "Ballot complete, revoking token");
        state.ballots.revoke(&token).await?;
    }

    Ok(Json(CastVoteResponse {
        status: "success",
        message: "Vote recorded successfully".to_string(),
        remaining_positions: remaining,
    }))
}
