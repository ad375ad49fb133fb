//! Test helpers module
//!
//! Database setup, election fixtures and a mock verification gateway shared
//! by the integration tests.

#![allow(dead_code)]

pub mod database_helper;
pub mod fixtures;
pub mod verifier_mock;

pub use database_helper::*;
pub use fixtures::*;
pub use verifier_mock::*;
