//! Queue backend configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounded in-process channel backend.
pub const BACKEND_MEMORY: &str = "memory";
/// Redis list backend.
pub const BACKEND_REDIS: &str = "redis";

/// Queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Backend: `"memory"` or `"redis"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Buffer capacity of the in-process backend.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Name of the Redis list carrying messages.
    #[serde(default = "default_redis_key")]
    pub redis_key: String,
    /// Upper bound on a single blocking pop, which also bounds shutdown latency.
    #[serde(default = "default_block_timeout")]
    pub block_timeout_seconds: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            capacity: default_capacity(),
            redis_key: default_redis_key(),
            block_timeout_seconds: default_block_timeout(),
        }
    }
}

impl QueueConfig {
    /// Blocking-pop timeout as a [`Duration`].
    pub fn block_timeout(&self) -> Duration {
        Duration::from_secs(self.block_timeout_seconds)
    }
}

fn default_backend() -> String {
    BACKEND_REDIS.to_string()
}

fn default_capacity() -> usize {
    64
}

fn default_redis_key() -> String {
    "attendance:checkins".to_string()
}

fn default_block_timeout() -> u64 {
    5
}
