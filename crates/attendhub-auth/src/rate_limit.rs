//! Per-client token-bucket rate limiter.
//!
//! State is process-local: it resets on restart and is not shared between
//! instances, so a horizontally scaled deployment admits up to
//! `instances * capacity` bursts per client.
//!
//! The table holds at most `max_tracked` buckets. When it is full, buckets
//! that have refilled to capacity are dropped; forgetting them admits
//! exactly what keeping them would. A new client that still finds no room
//! is rejected.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::warn;

use attendhub_core::config::rate_limit::RateLimitConfig;
use attendhub_core::traits::clock::Clock;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Bucket table bound used when none is configured.
pub const DEFAULT_MAX_TRACKED: usize = 10_000;

/// In-memory token bucket rate limiter keyed by caller identity.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Caller key → bucket state, behind one lock.
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
    /// Maximum tokens per bucket.
    capacity: u32,
    /// Tokens added per elapsed minute.
    refill_per_minute: u32,
    /// Most buckets kept at once.
    max_tracked: usize,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: u32,
    last_refill: DateTime<Utc>,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    pub fn new(capacity: u32, refill_per_minute: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            capacity,
            refill_per_minute,
            max_tracked: DEFAULT_MAX_TRACKED,
            clock,
        }
    }

    /// Creates a rate limiter from configuration.
    pub fn from_config(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.capacity, config.refill_per_minute, clock)
            .with_max_tracked(config.max_tracked_clients)
    }

    /// Bound the bucket table to `max_tracked` entries.
    pub fn with_max_tracked(mut self, max_tracked: usize) -> Self {
        self.max_tracked = max_tracked.max(1);
        self
    }

    /// Attempts to consume a token for `key`. Returns `true` if admitted.
    pub async fn allow(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock().await;

        if let Some(bucket) = buckets.get_mut(key) {
            let refill = self.refill_since(bucket.last_refill, now);
            if refill > 0 {
                bucket.tokens = bucket.tokens.saturating_add(refill).min(self.capacity);
                bucket.last_refill = now;
            }

            if bucket.tokens > 0 {
                bucket.tokens -= 1;
                return true;
            }
            return false;
        }

        if buckets.len() >= self.max_tracked {
            buckets.retain(|_, bucket| !self.is_refilled(bucket, now));
            if buckets.len() >= self.max_tracked {
                warn!(tracked = buckets.len(), "Rate limiter table full, rejecting new client");
                return false;
            }
        }

        buckets.insert(
            key.to_string(),
            TokenBucket {
                tokens: self.capacity.saturating_sub(1),
                last_refill: now,
            },
        );
        self.capacity > 0
    }

    /// Number of tracked keys.
    pub async fn tracked_keys(&self) -> usize {
        self.buckets.lock().await.len()
    }

    /// Whether `bucket` would be back at capacity if refilled at `now`.
    fn is_refilled(&self, bucket: &TokenBucket, now: DateTime<Utc>) -> bool {
        bucket
            .tokens
            .saturating_add(self.refill_since(bucket.last_refill, now))
            >= self.capacity
    }

    /// Whole tokens earned between `since` and `now`, rounded down.
    fn refill_since(&self, since: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
        let elapsed_ms = (now - since).num_milliseconds();
        if elapsed_ms <= 0 {
            return 0;
        }
        let earned = elapsed_ms as i128 * self.refill_per_minute as i128 / MILLIS_PER_MINUTE as i128;
        u32::try_from(earned).unwrap_or(u32::MAX)
    }
}
