//! Request logging middleware

use std::time::Instant;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, error, info, warn};

/// Log every request with its status and latency
pub async fn log_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        error!(method = %method, path = %path, status = status, latency_ms = latency_ms, "Request failed");
    } else if response.status().is_client_error() {
        warn!(method = %method, path = %path, status = status, latency_ms = latency_ms, "Request rejected");
    } else if path == "/health" {
        debug!(method = %method, path = %path, status = status, latency_ms = latency_ms, "Request completed");
    } else {
        info!(method = %method, path = %path, status = status, latency_ms = latency_ms, "Request completed");
    }

    response
}
