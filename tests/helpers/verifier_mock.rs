//! Mock verification gateway
//!
//! Simulates the face-matching service with wiremock.

use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};
use VoteDesk::config::VerificationConfig;

/// A tiny but well-formed webcam frame
pub const TEST_IMAGE: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQAAAQABAAD/2wBD";

pub struct GatewayMockServer {
    pub server: MockServer,
}

impl GatewayMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> VerificationConfig {
        VerificationConfig {
            api_url: self.server.uri(),
            timeout_seconds: 2,
            attempts_per_minute: 100,
        }
    }

    /// Recognize every frame as the given voter
    pub async fn mock_match(&self, voter_id: i64) {
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matched": true,
                "voter_id": voter_id,
                "display_name": "Recognized Voter"
            })))
            .mount(&self.server)
            .await;
    }

    /// Recognize no one
    pub async fn mock_no_match(&self, reason: &str) {
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matched": false,
                "reason": reason
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn reset(&self) {
        self.server.reset().await;
    }
}
