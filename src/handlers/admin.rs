//! Election administration endpoints

use std::net::SocketAddr;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{Map, Value};
use crate::app::AppState;
use super::json_body;
use crate::models::{
    CreateCandidateRequest, CreatePositionRequest, CreateSessionRequest, RegisterVoterRequest, Session, Voter,
};
use crate::utils::errors::Result;

#[derive(Debug, Deserialize)]
pub struct ActivateSessionRequest {
    pub session_id: i64,
}

fn created(key: &str, value: impl serde::Serialize) -> Result<Json<Value>> {
    let mut body = Map::new();
    body.insert("status".to_string(), Value::from("success"));
    body.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(Json(Value::Object(body)))
}

/// `GET /api/sessions`
pub async fn list_sessions(State(state): State<AppState>) -> Result<Json<Vec<Session>>> {
    Ok(Json(state.database.sessions.list().await?))
}

/// `POST /api/sessions`
pub async fn create_session(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    payload: std::result::Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = json_body(payload)?;
    let session = state.database.create_session(request, Some(peer.ip().to_string())).await?;
    created("session", session)
}

/// `POST /api/sessions/activate`
pub async fn activate_session(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    payload: std::result::Result<Json<ActivateSessionRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = json_body(payload)?;
    let session = state.database.activate_session(request.session_id, Some(peer.ip().to_string())).await?;
    created("session", session)
}

/// `POST /api/positions`
pub async fn create_position(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    payload: std::result::Result<Json<CreatePositionRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = json_body(payload)?;
    let position = state.database.create_position(request, Some(peer.ip().to_string())).await?;
    created("position", position)
}

/// `POST /api/candidates`
pub async fn create_candidate(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    payload: std::result::Result<Json<CreateCandidateRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = json_body(payload)?;
    let candidate = state.database.create_candidate(request, Some(peer.ip().to_string())).await?;
    created("candidate", candidate)
}

/// `GET /api/voters`
pub async fn list_voters(State(state): State<AppState>) -> Result<Json<Vec<Voter>>> {
    Ok(Json(state.database.voters.list().await?))
}

/// `POST /api/voters`
pub async fn register_voter(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    payload: std::result::Result<Json<RegisterVoterRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = json_body(payload)?;
    let voter = state.database.register_voter(request, Some(peer.ip().to_string())).await?;
    created("voter", voter)
}
