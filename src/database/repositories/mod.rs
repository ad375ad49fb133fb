//! Database repositories module
//!
//! This module contains all repository implementations for data access.
//! Methods taking an executor can run against the pool or inside a caller's
//! transaction.

pub mod session;
pub mod position;
pub mod candidate;
pub mod voter;
pub mod vote;
pub mod audit;

// Re-export repositories
pub use session::SessionRepository;
pub use position::PositionRepository;
pub use candidate::CandidateRepository;
pub use voter::VoterRepository;
pub use vote::{VoteRepository, NewVote};
pub use audit::AuditRepository;
