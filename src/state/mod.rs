//! State management module
//!
//! This module holds the ballot sessions of verified voters

pub mod ballot;

pub use ballot::{BallotSession, BallotStore, RedisBallotStore, MemoryBallotStore};
