//! Refresh token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A refresh token issued to a device.
///
/// Only `revoked` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// The signed token string.
    pub token: String,
    /// Owning device.
    pub device_id: String,
    /// Expiry instant (mirrors the JWT `exp` claim).
    pub expires_at: DateTime<Utc>,
    /// Set once the token has been rotated or explicitly revoked.
    pub revoked: bool,
    /// When the token was stored.
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Build a fresh, unrevoked record.
    pub fn new(
        token: impl Into<String>,
        device_id: impl Into<String>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            token: token.into(),
            device_id: device_id.into(),
            expires_at,
            revoked: false,
            created_at: now,
        }
    }

    /// Whether the token may still be exchanged at `now`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }
}
