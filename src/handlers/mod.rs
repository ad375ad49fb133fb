//! HTTP handlers module
//!
//! This module contains the axum handlers for every route

pub mod admin;
pub mod error;
pub mod health;
pub mod results;
pub mod voting;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use crate::utils::errors::{Result, VoteDeskError};

/// Unwrap a JSON body, turning malformed payloads into validation errors
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| VoteDeskError::Validation(rejection.body_text()))
}
