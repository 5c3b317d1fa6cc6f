//! Health check endpoint

use axum::http::StatusCode;

/// `GET /health` — liveness probe, always `200 OK`.
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
