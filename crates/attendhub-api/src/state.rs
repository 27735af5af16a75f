//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use attendhub_auth::jwt::JwtDecoder;
use attendhub_auth::rate_limit::RateLimiter;
use attendhub_core::config::AppConfig;
use attendhub_core::traits::queue::MessageQueue;
use attendhub_database::store::EventStore;
use attendhub_service::checkin::CheckinService;
use attendhub_service::session::DeviceSessionService;

use crate::metrics::MetricsHandle;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Event store (Postgres or in-memory)
    pub store: Arc<dyn EventStore>,
    /// Check-in queue (Redis or in-memory)
    pub queue: Arc<dyn MessageQueue>,

    // ── Access control ───────────────────────────────────────
    /// Access token validation
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Per-client admission control
    pub rate_limiter: Arc<RateLimiter>,

    // ── Services ─────────────────────────────────────────────
    /// Check-in ingestion
    pub checkin_service: Arc<CheckinService>,
    /// Device token sessions
    pub session_service: Arc<DeviceSessionService>,

    /// Prometheus exposition, absent when metrics are disabled
    pub metrics: Option<MetricsHandle>,

    /// Cancelled when the process begins shutting down
    pub shutdown: CancellationToken,
}
