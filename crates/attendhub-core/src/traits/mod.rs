//! Core traits defined in `attendhub-core` and implemented by other crates.

pub mod clock;
pub mod queue;

pub use clock::{Clock, ManualClock, SystemClock};
pub use queue::{MessageQueue, MessageStream};
