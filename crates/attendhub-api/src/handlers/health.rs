//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /healthz
///
/// 200 when the store and the queue both answer, 503 otherwise.
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, queue) = tokio::join!(state.store.health_check(), state.queue.health_check());

    let database = database.unwrap_or_else(|e| {
        warn!(error = %e, "Event store health check failed");
        false
    });
    let queue = queue.unwrap_or_else(|e| {
        warn!(error = %e, "Queue health check failed");
        false
    });

    let healthy = database && queue;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            database,
            queue,
        }),
    )
}
