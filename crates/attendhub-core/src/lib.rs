//! # attendhub-core
//!
//! Core crate for AttendHub. Contains configuration schemas, the clock
//! and queue traits shared by the pipeline crates, the queue message type,
//! pipeline counters, and the unified error system.
//!
//! This crate has **no** internal dependencies on other AttendHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
