//! HTTP mapping of application errors

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info, warn};
use crate::utils::errors::{ErrorKind, ErrorSeverity, VoteDeskError};

/// Seconds a client should wait before retrying a transient failure
const RETRY_AFTER_SECONDS: &str = "5";

impl VoteDeskError {
    /// Message safe to show to clients
    pub fn client_message(&self) -> String {
        match self {
            VoteDeskError::Validation(message) => message.clone(),
            VoteDeskError::VoteRejected(reason) => reason.message().to_string(),
            VoteDeskError::NoActiveSession => "No active election session".to_string(),
            VoteDeskError::NotVerified => "Voter not verified".to_string(),
            VoteDeskError::RateLimitExceeded => "Too many attempts, please wait and try again".to_string(),
            _ => match self.kind() {
                ErrorKind::Validation => "Invalid request".to_string(),
                ErrorKind::TransientUnavailability => {
                    "Service temporarily unavailable, please retry".to_string()
                }
                _ => "Internal server error".to_string(),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        if matches!(self, VoteDeskError::RateLimitExceeded) {
            return StatusCode::TOO_MANY_REQUESTS;
        }
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::DuplicateVote => StatusCode::CONFLICT,
            ErrorKind::NoActiveSession | ErrorKind::TransientUnavailability => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for VoteDeskError {
    fn into_response(self) -> Response {
        match self.severity() {
            ErrorSeverity::Info => info!(error = %self, "Request refused"),
            ErrorSeverity::Warning => warn!(error = %self, "Request failed"),
            ErrorSeverity::Error | ErrorSeverity::Critical => error!(error = %self, severity = %self.severity(), "Request failed"),
        }

        let status = self.status_code();
        let body = Json(json!({
            "status": "error",
            "message": self.client_message(),
        }));

        let mut response = (status, body).into_response();
        if self.kind() == ErrorKind::TransientUnavailability {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECONDS));
        }
        response
    }
}
