//! Shared value types.

pub mod message;

pub use message::Message;
