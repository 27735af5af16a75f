//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use attendhub_auth::jwt::TokenPair;
use attendhub_entity::event::{Event, EventStatus};

/// Tokens issued at registration and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Access token expiry, unix seconds.
    pub expires_at: i64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            expires_at: pair.access_expires_at.timestamp(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

/// Acknowledgement of an accepted check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinAccepted {
    /// The created or deduplicated event.
    pub event_id: Uuid,
    /// When the event occurred.
    pub when: DateTime<Utc>,
    /// Current status of the event.
    pub status: EventStatus,
}

impl From<&Event> for CheckinAccepted {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.id,
            when: event.occurred_at,
            status: event.status,
        }
    }
}

/// Event listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventListResponse {
    /// Events, newest first.
    pub events: Vec<Event>,
}

/// Liveness and dependency health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Event store reachable.
    pub database: bool,
    /// Queue reachable.
    pub queue: bool,
}
