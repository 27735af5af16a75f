//! # attendhub-queue
//!
//! Queue backends for AttendHub. Supports two modes:
//!
//! - **memory**: bounded in-process channel with publisher backpressure
//! - **redis**: durable Redis list, `LPUSH` to publish and `BRPOP` to consume
//!
//! The backend is selected at runtime based on configuration. Both carry
//! [`Message`](attendhub_core::types::Message) values; the Redis backend
//! stores them with the length-prefixed encoding in [`codec`].

pub mod codec;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::QueueManager;
