//! Check-in events and their verification lifecycle.

pub mod model;
pub mod outcome;
pub mod status;

pub use model::{Event, EventQuery, NewEvent};
pub use outcome::EventOutcome;
pub use status::EventStatus;
