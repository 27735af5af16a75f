//! Token bucket rate limiting keyed by client identity.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use attendhub_core::error::AppError;
use attendhub_core::telemetry;

use crate::error::ApiError;
use crate::state::AppState;

/// Header set by proxies in front of the API.
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity a request is limited under: the peer IP, or the first
/// `X-Forwarded-For` hop when `trust_forwarded_for` is set and the header
/// is present.
pub fn client_key(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());
        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rejects requests with 429 once the caller's bucket is empty.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let key = client_key(&request, state.config.rate_limit.trust_forwarded_for);
    if state.rate_limiter.allow(&key).await {
        next.run(request).await
    } else {
        warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        telemetry::record_rate_limited();
        ApiError(AppError::rate_limited("Too many requests")).into_response()
    }
}
