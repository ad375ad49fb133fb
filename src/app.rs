//! Application state and HTTP router

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};
use crate::config::Settings;
use crate::database::{DatabasePool, DatabaseService};
use crate::handlers::{admin, health, results, voting};
use crate::middleware::{limit_by_client, log_requests, ClientRateLimiter};
use crate::services::{ReportingService, TallyEngine, VerificationService, VoterVerifier, VotingService};
use crate::state::BallotStore;
use crate::utils::errors::Result;

/// Header carrying the ballot token issued by verify-voter
pub const BALLOT_TOKEN_HEADER: &str = "x-ballot-token";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub database: DatabaseService,
    pub voting: VotingService,
    pub verification: VerificationService,
    pub reporting: ReportingService,
    pub ballots: Arc<dyn BallotStore>,
    pub verify_limiter: ClientRateLimiter,
}

impl AppState {
    pub fn new(
        settings: Settings,
        pool: DatabasePool,
        verifier: Arc<dyn VoterVerifier>,
        ballots: Arc<dyn BallotStore>,
    ) -> Self {
        let database = DatabaseService::new(pool.clone());
        let tally = TallyEngine::new(pool.clone());
        let voting = VotingService::new(pool);
        let verification =
            VerificationService::new(database.clone(), verifier, ballots.clone(), &settings.ballot);
        let reporting = ReportingService::new(database.clone(), tally, settings.reporting.clone());
        let verify_limiter = ClientRateLimiter::per_minute(settings.verification.attempts_per_minute);

        Self {
            settings: Arc::new(settings),
            database,
            voting,
            verification,
            reporting,
            ballots,
            verify_limiter,
        }
    }
}

/// Build the full router
pub fn build_router(state: AppState) -> Router {
    let verify_route = Router::new()
        .route("/api/verify-voter", post(voting::verify_voter))
        .route_layer(middleware::from_fn_with_state(state.verify_limiter.clone(), limit_by_client));

    let api = Router::new()
        .route("/api/election-data", get(results::election_data))
        .route("/api/recent-votes", get(results::recent_votes))
        .route("/api/audit-log", get(results::audit_log))
        .route("/api/positions", get(voting::list_positions).post(admin::create_position))
        .route("/api/candidates", get(voting::list_candidates).post(admin::create_candidate))
        .route("/api/vote", post(voting::cast_vote))
        .route("/api/sessions", get(admin::list_sessions).post(admin::create_session))
        .route("/api/sessions/activate", post(admin::activate_session))
        .route("/api/voters", get(admin::list_voters).post(admin::register_voter))
        .route("/health", get(health::health))
        .merge(verify_route);

    api.layer(cors_layer(&state.settings.server.allowed_origins))
        .layer(DefaultBodyLimit::max(state.settings.server.max_body_bytes))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(BALLOT_TOKEN_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

/// One pass over expired ballot sessions and idle rate-limit entries
pub async fn sweep_expired(state: &AppState) -> Result<usize> {
    let purged = state.ballots.purge_expired().await?;
    let tracked = state.verify_limiter.purge_idle();

    if purged > 0 {
        info!(purged = purged, "Removed expired ballot sessions");
    }
    debug!(tracked_clients = tracked, "Rate limiter swept");
    Ok(purged)
}

/// Run `sweep_expired` on the configured interval until aborted
pub fn spawn_maintenance(state: AppState) -> JoinHandle<()> {
    let period = state.settings.ballot.cleanup_interval();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = sweep_expired(&state).await {
                error!(error = %e, "Maintenance sweep failed");
            }
        }
    })
}

/// Serve until ctrl-c or SIGTERM
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let address = listener.local_addr()?;
    let maintenance = spawn_maintenance(state.clone());
    let app = build_router(state);

    info!("Server running on {address}");

    let served = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await;
    maintenance.abort();
    served?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
