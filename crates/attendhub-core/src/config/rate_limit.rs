//! Request rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Token-bucket settings for the per-client admission gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether the limiter middleware is installed.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Bucket capacity (burst size).
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    /// Tokens added per elapsed minute.
    #[serde(default = "default_refill")]
    pub refill_per_minute: u32,
    /// Key clients on the first `X-Forwarded-For` hop instead of the peer
    /// address. Enable only behind a proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
    /// Upper bound on tracked client buckets.
    #[serde(default = "default_max_tracked_clients")]
    pub max_tracked_clients: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            capacity: default_capacity(),
            refill_per_minute: default_refill(),
            trust_forwarded_for: false,
            max_tracked_clients: default_max_tracked_clients(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> u32 {
    120
}

fn default_refill() -> u32 {
    120
}

fn default_max_tracked_clients() -> usize {
    10_000
}
