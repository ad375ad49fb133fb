//! Middleware module
//!
//! This module contains the HTTP middleware layered onto the router

pub mod logging;
pub mod rate_limit;

pub use logging::log_requests;
pub use rate_limit::{ClientRateLimiter, limit_by_client};
