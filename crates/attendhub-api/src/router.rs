//! Route definitions for the AttendHub HTTP API.
//!
//! Device-facing routes are mounted under `/v1`; `/healthz` and
//! `/metrics` sit at the root. Every route except `/metrics` passes
//! through the rate limiter.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes, rate limiting and the body limit.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let v1_routes = Router::new()
        .merge(device_routes())
        .merge(auth_routes())
        .merge(checkin_routes())
        .merge(event_routes());

    let router = Router::new()
        .nest("/v1", v1_routes)
        .route("/healthz", get(handlers::health::healthz))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ));

    // Outside the rate limiter.
    let router = if state.metrics.is_some() {
        router.route(
            handlers::metrics::METRICS_PATH,
            get(handlers::metrics::metrics),
        )
    } else {
        router
    };

    router.with_state(state)
}

/// Device registration
fn device_routes() -> Router<AppState> {
    Router::new().route("/devices/register", post(handlers::device::register_device))
}

/// Token rotation and revocation
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/revoke", post(handlers::auth::revoke))
}

/// Check-in submission
fn checkin_routes() -> Router<AppState> {
    Router::new().route("/checkins", post(handlers::checkin::create_checkin))
}

/// Event reads
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::event::list_events))
        .route("/events/{id}", get(handlers::event::get_event))
}
