//! API Middleware
//!
//! Request logging with a per-request correlation id.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use uuid::Uuid;

/// Log every request: correlation id, method, path, status, latency.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let correlation_id = request
        .headers()
        .get("X-Correlation-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %correlation_id,
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
