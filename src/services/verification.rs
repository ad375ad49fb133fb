//! Voter verification
//!
//! Identity matching is delegated to an external gateway that receives the
//! captured webcam frame. A successful match against a registered voter with
//! positions left to vote on yields a ballot token.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::config::{BallotConfig, VerificationConfig};
use crate::database::DatabaseService;
use crate::models::audit::{voter_actor, AuditAction, NewAuditEntry};
use crate::state::{BallotSession, BallotStore};
use crate::utils::errors::{Result, VerificationError, VoteDeskError};
use crate::utils::helpers::is_image_data_url;
use crate::utils::logging;

/// Identity reported by the gateway for a matched face
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub voter_id: i64,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    Matched(VerifiedIdentity),
    Rejected(String),
}

#[async_trait]
pub trait VoterVerifier: Send + Sync {
    async fn verify(&self, image: &str) -> Result<VerificationOutcome>;
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    matched: bool,
    voter_id: Option<i64>,
    display_name: Option<String>,
    reason: Option<String>,
}

/// Verification gateway reached over HTTP
#[derive(Clone, Debug)]
pub struct HttpVoterVerifier {
    client: Client,
    api_url: String,
}

impl HttpVoterVerifier {
    pub fn new(config: &VerificationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("VoteDesk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl VoterVerifier for HttpVoterVerifier {
    async fn verify(&self, image: &str) -> Result<VerificationOutcome> {
        let url = format!("{}/verify", self.api_url);
        debug!(url = %url, payload_bytes = image.len(), "Calling verification gateway");

        let response = self
            .client
            .post(&url)
            .json(&GatewayRequest { image })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VerificationError::Timeout
                } else if e.is_connect() {
                    VerificationError::ServiceUnavailable
                } else {
                    VerificationError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Verification gateway refused request");
            return Err(VerificationError::ServiceUnavailable.into());
        }

        let body: GatewayResponse = response
            .json()
            .await
            .map_err(|e| VerificationError::InvalidResponse(e.to_string()))?;

        if !body.matched {
            let reason = body.reason.unwrap_or_else(|| "Face not recognized".to_string());
            return Ok(VerificationOutcome::Rejected(reason));
        }

        let voter_id = body.voter_id.ok_or_else(|| {
            VerificationError::InvalidResponse("matched response without voter_id".to_string())
        })?;

        Ok(VerificationOutcome::Matched(VerifiedIdentity {
            voter_id,
            display_name: body.display_name,
        }))
    }
}

/// A voter cleared to vote
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedVoter {
    pub voter_id: i64,
    pub voter_name: String,
    pub ballot_token: String,
    pub remaining_positions: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerifyVoterResult {
    Verified(VerifiedVoter),
    Rejected(String),
}

#[derive(Clone)]
pub struct VerificationService {
    database: DatabaseService,
    verifier: Arc<dyn VoterVerifier>,
    ballots: Arc<dyn BallotStore>,
    ballot_ttl_seconds: u64,
}

impl VerificationService {
    pub fn new(
        database: DatabaseService,
        verifier: Arc<dyn VoterVerifier>,
        ballots: Arc<dyn BallotStore>,
        config: &BallotConfig,
    ) -> Self {
        Self {
            database,
            verifier,
            ballots,
            ballot_ttl_seconds: config.ttl_seconds,
        }
    }

    /// Verify a captured frame and issue a ballot token.
    ///
    /// Malformed payloads and a missing active session are errors. Every
    /// outcome that reaches the gateway is written to the audit log,
    /// including gateway failures.
    pub async fn verify_voter(&self, image: &str, source_ip: Option<String>) -> Result<VerifyVoterResult> {
        if !is_image_data_url(image) {
            return Err(VoteDeskError::Validation("Image must be a base64 image data URL".to_string()));
        }

        let session = self.database.sessions.active().await?.ok_or(VoteDeskError::NoActiveSession)?;

        let outcome = match self.verifier.verify(image).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.record_gateway_failure(&e, source_ip.as_deref()).await;
                return Err(e);
            }
        };

        let identity = match outcome {
            VerificationOutcome::Matched(identity) => identity,
            VerificationOutcome::Rejected(reason) => {
                return self.reject(None, reason, source_ip).await;
            }
        };

        let Some(voter) = self.database.voters.get(identity.voter_id).await? else {
            return self
                .reject(Some(identity.voter_id), "Voter is not registered".to_string(), source_ip)
                .await;
        };

        let remaining = self.database.voters.remaining_position_ids(voter.id, session.id).await?;
        if remaining.is_empty() {
            return self
                .reject(Some(voter.id), "This voter has already voted".to_string(), source_ip)
                .await;
        }

        let ballot = BallotSession::new(voter.id, voter.name.clone(), session.id, self.ballot_ttl_seconds);
        let ballot_token = self.ballots.issue(ballot).await?;

        let mut details = format!("Voter verified: {} ({})", voter.name, voter.grade);
        if let Some(gateway_name) = identity.display_name.as_deref().filter(|name| *name != voter.name) {
            warn!(voter_id = voter.id, gateway_name = %gateway_name, "Gateway name differs from registry");
            details.push_str(&format!(", gateway name: {}", gateway_name));
        }

        let entry = NewAuditEntry::new(voter_actor(voter.id), AuditAction::VoterVerified)
            .with_details(details)
            .with_source_ip(source_ip.clone());
        self.database.audit.record(&entry).await?;

        logging::log_verification(Some(voter.id), true, source_ip.as_deref(), None);

        Ok(VerifyVoterResult::Verified(VerifiedVoter {
            voter_id: voter.id,
            voter_name: voter.name,
            ballot_token,
            remaining_positions: remaining,
        }))
    }

    // The gateway error is what the caller sees; a failed audit write is only logged.
    async fn record_gateway_failure(&self, error: &VoteDeskError, source_ip: Option<&str>) {
        let entry = NewAuditEntry::new("anonymous", AuditAction::VerificationFailed)
            .with_details(format!("Verification gateway error: {}", error))
            .with_source_ip(source_ip.map(str::to_string));

        if let Err(e) = self.database.audit.record(&entry).await {
            warn!(error = %e, "Failed to audit verification gateway error");
        }
        logging::log_verification(None, false, source_ip, Some("gateway error"));
    }

    async fn reject(&self, voter_id: Option<i64>, reason: String, source_ip: Option<String>) -> Result<VerifyVoterResult> {
        let actor = voter_id.map(voter_actor).unwrap_or_else(|| "anonymous".to_string());
        let entry = NewAuditEntry::new(actor, AuditAction::VerificationRejected)
            .with_details(reason.clone())
            .with_source_ip(source_ip.clone());
        self.database.audit.record(&entry).await?;

        logging::log_verification(voter_id, false, source_ip.as_deref(), Some(&reason));

        Ok(VerifyVoterResult::Rejected(reason))
    }
}
