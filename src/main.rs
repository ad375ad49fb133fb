//! VoteDesk
//!
//! Main application entry point

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use VoteDesk::{
    app::{self, AppState},
    config::{BallotBackend, Settings},
    database::connection,
    services::{HttpVoterVerifier, VoterVerifier},
    state::{BallotStore, MemoryBallotStore, RedisBallotStore},
    utils::logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", VoteDesk::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = connection::create_pool(&settings.database).await?;

    connection::run_migrations(&db_pool).await?;

    let ballots: Arc<dyn BallotStore> = match settings.ballot.backend {
        BallotBackend::Redis => {
            info!("Connecting to Redis for ballot sessions...");
            Arc::new(RedisBallotStore::new(&settings.redis).await?)
        }
        BallotBackend::Memory => {
            info!("Using in-process ballot sessions");
            Arc::new(MemoryBallotStore::new())
        }
    };

    let verifier: Arc<dyn VoterVerifier> = Arc::new(HttpVoterVerifier::new(&settings.verification)?);

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {}", address);

    let state = AppState::new(settings, db_pool, verifier, ballots);
    app::serve(listener, state).await?;

    info!("VoteDesk has been shut down.");
    Ok(())
}
