//! Queue manager that dispatches to the configured backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use attendhub_core::config::AppConfig;
use attendhub_core::error::AppError;
use attendhub_core::result::AppResult;
use attendhub_core::traits::queue::{MessageQueue, MessageStream};
use attendhub_core::types::Message;

/// Queue manager that wraps the configured queue backend.
///
/// The backend is selected once, at construction time.
#[derive(Debug, Clone)]
pub struct QueueManager {
    inner: Arc<dyn MessageQueue>,
}

impl QueueManager {
    /// Create a queue manager from configuration.
    pub async fn new(config: &AppConfig) -> AppResult<Self> {
        let inner: Arc<dyn MessageQueue> = match config.queue.backend.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!(key = %config.queue.redis_key, "Initializing Redis queue backend");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisQueue::new(
                    client,
                    config.queue.redis_key.clone(),
                    config.queue.block_timeout(),
                ))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!(
                    capacity = config.queue.capacity,
                    "Initializing in-memory queue backend"
                );
                Arc::new(crate::memory::MemoryQueue::new(config.queue.capacity))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown queue backend: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }
}

#[async_trait]
impl MessageQueue for QueueManager {
    async fn publish(&self, message: Message, cancel: &CancellationToken) -> AppResult<()> {
        self.inner.publish(message, cancel).await
    }

    async fn consume(&self, cancel: CancellationToken) -> AppResult<MessageStream> {
        self.inner.consume(cancel).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
