//! Ballot session storage
//!
//! A ballot session is issued after a voter passes verification and is
//! presented on every vote via an opaque token. Sessions expire after the
//! configured TTL and are revoked once the voter has nothing left to vote on.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use crate::config::RedisConfig;
use crate::utils::errors::Result;
use crate::utils::helpers::generate_ballot_token;

/// A verified voter's right to vote in one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallotSession {
    pub voter_id: i64,
    pub voter_name: String,
    pub session_id: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl BallotSession {
    pub fn new(voter_id: i64, voter_name: impl Into<String>, session_id: i64, ttl_seconds: u64) -> Self {
        let issued_at = Utc::now();
        Self {
            voter_id,
            voter_name: voter_name.into(),
            session_id,
            issued_at,
            expires_at: issued_at + Duration::seconds(ttl_seconds as i64),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[async_trait]
pub trait BallotStore: Send + Sync {
    /// Store the session and return the token that identifies it
    async fn issue(&self, ballot: BallotSession) -> Result<String>;

    /// Look up a live session by token
    async fn resolve(&self, token: &str) -> Result<Option<BallotSession>>;

    /// Invalidate a token; unknown tokens are ignored
    async fn revoke(&self, token: &str) -> Result<()>;

    /// Drop expired sessions and return how many were removed
    async fn purge_expired(&self) -> Result<usize>;
}

/// Redis-backed ballot sessions, shared between server instances
#[derive(Clone)]
pub struct RedisBallotStore {
    connection_manager: redis::aio::ConnectionManager,
    prefix: String,
}

impl RedisBallotStore {
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            prefix: config.prefix.clone(),
        })
    }

    fn key(&self, token: &str) -> String {
        format!("{}ballot:{}", self.prefix, token)
    }
}

#[async_trait]
impl BallotStore for RedisBallotStore {
    async fn issue(&self, ballot: BallotSession) -> Result<String> {
        let token = generate_ballot_token();
        let ttl_seconds = (ballot.expires_at - Utc::now()).num_seconds().max(1) as u64;
        let serialized = serde_json::to_string(&ballot)?;

        let mut conn = self.connection_manager.clone();
        conn.set_ex::<_, _, ()>(self.key(&token), serialized, ttl_seconds).await?;

        debug!(voter_id = ballot.voter_id, ttl_seconds = ttl_seconds, "Ballot session issued");
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<BallotSession>> {
        let mut conn = self.connection_manager.clone();
        let serialized: Option<String> = conn.get(self.key(token)).await?;

        let Some(data) = serialized else {
            return Ok(None);
        };

        match serde_json::from_str::<BallotSession>(&data) {
            Ok(ballot) if !ballot.is_expired() => Ok(Some(ballot)),
            Ok(_) => {
                self.revoke(token).await?;
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable ballot session");
                self.revoke(token).await?;
                Ok(None)
            }
        }
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let deleted: u32 = conn.del(self.key(token)).await?;
        debug!(deleted = deleted, "Ballot session revoked");
        Ok(())
    }

    // Keys carry their own EX, Redis evicts them.
    async fn purge_expired(&self) -> Result<usize> {
        Ok(0)
    }
}

/// In-process ballot sessions for single-instance deployments and tests
#[derive(Clone, Default)]
pub struct MemoryBallotStore {
    sessions: Arc<RwLock<HashMap<String, BallotSession>>>,
}

impl MemoryBallotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BallotStore for MemoryBallotStore {
    async fn issue(&self, ballot: BallotSession) -> Result<String> {
        let token = generate_ballot_token();
        self.sessions.write().await.insert(token.clone(), ballot);
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<BallotSession>> {
        let found = self.sessions.read().await.get(token).cloned();
        match found {
            Some(ballot) if ballot.is_expired() => {
                self.sessions.write().await.remove(token);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, ballot| !ballot.is_expired());
        Ok(before - sessions.len())
    }
}
