//! Per-request access log.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

use crate::handlers::metrics::METRICS_PATH;

/// Emits one line per request. Server errors are logged at `warn`.
/// Metric scrapes are not logged.
pub async fn request_logging(request: Request, next: Next) -> Response {
    if request.uri().path() == METRICS_PATH {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let duration_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), duration_ms, "Request failed");
    } else {
        info!(%method, %path, status = status.as_u16(), duration_ms, "Request served");
    }

    response
}
