//! Device registration and deduplicated check-in ingestion.

pub mod service;

pub use service::{CheckinOutcome, CheckinRequest, CheckinService};
