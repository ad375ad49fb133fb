//! Services module
//!
//! This module contains the election business logic

pub mod tally;
pub mod voting;
pub mod verification;
pub mod reporting;

// Re-export commonly used services
pub use tally::{TallyEngine, build_snapshot};
pub use voting::{VotingService, Ballot};
pub use verification::{
    VerificationService, VoterVerifier, HttpVoterVerifier, VerificationOutcome, VerifiedIdentity,
    VerifiedVoter, VerifyVoterResult,
};
pub use reporting::ReportingService;
