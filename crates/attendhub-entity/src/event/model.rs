//! Event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::EventStatus;

/// Page size used when a query does not ask for one.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Largest page size a query may request.
pub const MAX_LIST_LIMIT: i64 = 200;

/// A check-in event. Rows are an audit trail and are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,
    /// The person checking in.
    pub user_id: String,
    /// The device that captured the check-in.
    pub device_id: String,
    /// When the check-in happened (UTC).
    pub occurred_at: DateTime<Utc>,
    /// Free-form location label supplied by the device.
    pub location: Option<String>,
    /// Reference to the captured image, passed to the face verifier.
    pub image_ref: String,
    /// Verification status.
    pub status: EventStatus,
    /// Match confidence; present iff `status` is `processed`.
    pub match_score: Option<f64>,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Whether the worker has already finalized this event.
    pub fn is_finalized(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Data required to create a new pending event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Pre-generated identifier.
    pub id: Uuid,
    /// The person checking in.
    pub user_id: String,
    /// The capturing device.
    pub device_id: String,
    /// Check-in instant.
    pub occurred_at: DateTime<Utc>,
    /// Optional location label.
    pub location: Option<String>,
    /// Image reference.
    pub image_ref: String,
}

impl NewEvent {
    /// Materialize the pending row this creates.
    pub fn into_pending(self) -> Event {
        Event {
            id: self.id,
            user_id: self.user_id,
            device_id: self.device_id,
            occurred_at: self.occurred_at,
            location: self.location,
            image_ref: self.image_ref,
            status: EventStatus::Pending,
            match_score: None,
            created_at: self.occurred_at,
        }
    }
}

/// Filters and paging for event listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Restrict to one device.
    pub device_id: Option<String>,
    /// Restrict to one user.
    pub user_id: Option<String>,
    /// Requested page size; see [`EventQuery::limit`].
    pub limit: Option<i64>,
    /// Requested offset; see [`EventQuery::offset`].
    pub offset: Option<i64>,
}

impl EventQuery {
    /// Effective page size: defaults when absent or non-positive, clamped above.
    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(limit) if limit > 0 => limit.min(MAX_LIST_LIMIT),
            _ => DEFAULT_LIST_LIMIT,
        }
    }

    /// Effective offset; negatives become zero.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Empty filter strings are treated as absent.
    pub fn device_filter(&self) -> Option<&str> {
        self.device_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Empty filter strings are treated as absent.
    pub fn user_filter(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether an event passes the filters (ignoring paging).
    pub fn matches(&self, event: &Event) -> bool {
        self.device_filter().is_none_or(|d| event.device_id == d)
            && self.user_filter().is_none_or(|u| event.user_id == u)
    }
}
