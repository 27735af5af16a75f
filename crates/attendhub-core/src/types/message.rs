//! The unit of work carried by the queue.

use serde::{Deserialize, Serialize};

/// Message type for a submitted check-in; the body is the event id.
pub const CHECKIN_MESSAGE_TYPE: &str = "checkin";

/// A typed, opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Discriminator used by consumers to route or skip the message.
    pub message_type: String,
    /// Opaque body bytes.
    pub body: Vec<u8>,
}

impl Message {
    /// Create a message from its parts.
    pub fn new(message_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            message_type: message_type.into(),
            body: body.into(),
        }
    }

    /// A check-in message referencing an event id.
    pub fn checkin(event_id: impl ToString) -> Self {
        Self::new(CHECKIN_MESSAGE_TYPE, event_id.to_string().into_bytes())
    }

    /// Whether this is a check-in message.
    pub fn is_checkin(&self) -> bool {
        self.message_type == CHECKIN_MESSAGE_TYPE
    }

    /// The body as UTF-8 text, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}
