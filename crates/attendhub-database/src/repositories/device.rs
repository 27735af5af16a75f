//! Device repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use attendhub_core::error::{AppError, ErrorKind};
use attendhub_core::result::AppResult;
use attendhub_entity::device::Device;

/// Repository for the `devices` table.
#[derive(Debug, Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Create a new device repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a device by its identity.
    pub async fn find_by_id(&self, device_id: &str) -> AppResult<Option<Device>> {
        sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE device_id = $1")
            .bind(device_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find device", e))
    }

    /// Insert the device if absent and return the stored row.
    ///
    /// An existing row is left untouched, so `created_at` keeps the first
    /// registration time.
    pub async fn upsert(&self, device_id: &str, now: DateTime<Utc>) -> AppResult<Device> {
        sqlx::query(
            "INSERT INTO devices (device_id, created_at) VALUES ($1, $2) \
             ON CONFLICT (device_id) DO NOTHING",
        )
        .bind(device_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register device", e))?;

        self.find_by_id(device_id)
            .await?
            .ok_or_else(|| AppError::database(format!("Device '{device_id}' vanished after upsert")))
    }
}
