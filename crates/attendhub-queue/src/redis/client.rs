//! Redis connection management.

use std::time::Duration;

use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::{AsyncConnectionConfig, Client};
use tracing::info;

use attendhub_core::config::redact_url;
use attendhub_core::config::redis::RedisConfig;
use attendhub_core::error::{AppError, ErrorKind};
use attendhub_core::result::AppResult;

/// Redis client wrapper with connection management.
#[derive(Debug, Clone)]
pub struct RedisClient {
    /// Client used to open dedicated connections.
    client: Client,
    /// Shared, reconnecting connection for non-blocking commands.
    conn: ConnectionManager,
}

impl RedisClient {
    /// Create a new Redis client from configuration.
    pub async fn connect(config: &RedisConfig) -> AppResult<Self> {
        info!(url = %redact_url(&config.url), "Connecting to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Queue, "Failed to create Redis client", e)
        })?;

        let conn = ConnectionManager::new(client.clone()).await.map_err(|e| {
            AppError::with_source(ErrorKind::Queue, "Failed to connect to Redis", e)
        })?;

        info!("Connected to Redis");
        Ok(Self { client, conn })
    }

    /// Get a mutable clone of the shared connection manager.
    pub fn conn_mut(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Open a connection that is not shared with other callers.
    ///
    /// Blocking commands such as `BRPOP` stall every command pipelined
    /// behind them, so they run on their own connection. `response_timeout`
    /// must outlast the server-side block, otherwise the client abandons a
    /// pop whose reply is still on its way.
    pub async fn dedicated_connection(
        &self,
        response_timeout: Duration,
    ) -> AppResult<MultiplexedConnection> {
        let config = AsyncConnectionConfig::new().set_response_timeout(Some(response_timeout));
        self.client
            .get_multiplexed_async_connection_with_config(&config)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Queue, "Failed to open Redis connection", e)
            })
    }

    /// `PING` the server.
    pub async fn ping(&self) -> AppResult<bool> {
        let mut conn = self.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Queue, "Redis PING failed", e))?;
        Ok(pong == "PONG")
    }
}
