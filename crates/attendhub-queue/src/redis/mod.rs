//! Redis list queue backend.

pub mod client;
pub mod list;

pub use client::RedisClient;
pub use list::RedisQueue;
