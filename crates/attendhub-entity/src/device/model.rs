//! Device entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A client device. Created once at registration and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Device {
    /// Caller-chosen unique device identity (e.g. `"kiosk-1"`).
    pub device_id: String,
    /// When the device first registered.
    pub created_at: DateTime<Utc>,
}
