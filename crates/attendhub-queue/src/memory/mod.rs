//! Bounded in-process queue backend.

pub mod channel;

pub use channel::MemoryQueue;
