//! Rate limiting middleware
//!
//! Caps verification attempts per client address so the gateway cannot be
//! used to brute-force identities.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;
use crate::utils::errors::VoteDeskError;

/// Per-address limiter shared by all requests on a route
#[derive(Clone)]
pub struct ClientRateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl ClientRateLimiter {
    /// Allow `per_minute` requests per address; zero is treated as one
    pub fn per_minute(per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    pub fn check(&self, address: IpAddr) -> bool {
        self.limiter.check_key(&address).is_ok()
    }

    /// Forget addresses whose quota has fully replenished; returns how many remain tracked
    pub fn purge_idle(&self) -> usize {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        self.limiter.len()
    }
}

/// Reject requests from addresses that exhausted their quota
pub async fn limit_by_client(
    State(limiter): State<ClientRateLimiter>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.check(peer.ip()) {
        warn!(client = %peer.ip(), path = %request.uri().path(), "Rate limit exceeded");
        return VoteDeskError::RateLimitExceeded.into_response();
    }

    next.run(request).await
}
