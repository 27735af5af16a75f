//! # attendhub-service
//!
//! Business logic service layer for AttendHub. Services orchestrate the
//! event store and the token authority to implement the check-in use
//! cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod checkin;
pub mod session;

pub use checkin::{CheckinOutcome, CheckinRequest, CheckinService};
pub use session::DeviceSessionService;
