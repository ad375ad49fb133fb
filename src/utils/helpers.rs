//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use regex::Regex;
use uuid::Uuid;

/// Generate a new opaque ballot token
pub fn generate_ballot_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn image_data_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^data:image/[A-Za-z0-9.+-]+;base64,[A-Za-z0-9+/=\r\n]+$")
            .expect("image data URL pattern is valid")
    })
}

/// Check that a captured webcam frame is a base64 image data URL
pub fn is_image_data_url(payload: &str) -> bool {
    image_data_url_pattern().is_match(payload)
}

/// Resolve a client-supplied page size against a default and an upper bound
pub fn clamp_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    match requested {
        Some(limit) if limit > 0 => limit.min(max),
        _ => default.min(max),
    }
}

/// Round a ratio to a percentage with one decimal place.
///
/// Returns 0.0 when the denominator is zero. Rounds half up on the tenths
/// digit using integer arithmetic so equal inputs always give equal output.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    let tenths = (part * 1000 * 2 + whole) / (whole * 2);
    tenths as f64 / 10.0
}
