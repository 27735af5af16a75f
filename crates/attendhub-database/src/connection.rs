//! PostgreSQL connection pool.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use attendhub_core::config::database::DatabaseConfig;
use attendhub_core::config::redact_url;
use attendhub_core::error::{AppError, ErrorKind};

/// Owned sqlx pool, built from [`DatabaseConfig`].
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool. Fails if no connection can be acquired within
    /// `connect_timeout_seconds`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            url = %redact_url(&config.url),
            max = config.max_connections,
            min = config.min_connections,
            "Opening PostgreSQL pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Could not reach PostgreSQL", e)
            })?;

        Ok(Self { pool })
    }

    /// Borrow the pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Take the pool.
    pub fn into_pool(self) -> PgPool {
        self.pool
    }

    /// Close every connection. Used by one-shot CLI commands.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// `SELECT 1` round trip.
pub async fn ping(pool: &PgPool) -> Result<bool, AppError> {
    let one: i32 = sqlx::query_scalar("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Database ping failed", e))?;
    Ok(one == 1)
}
