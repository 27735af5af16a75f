//! Turns one queue message into a finalized event.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use attendhub_core::telemetry;
use attendhub_core::types::Message;
use attendhub_database::store::EventStore;
use attendhub_entity::event::{Event, EventOutcome};

use crate::verifier::FaceVerifier;

/// What happened to a message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Not a check-in message.
    SkippedUnknownType(String),
    /// The body was not an event id.
    DroppedInvalidBody,
    /// The event could not be loaded; the message is not retried.
    DroppedMissingEvent(Uuid),
    /// The event had already been finalized.
    SkippedTerminal(Uuid),
    /// The event reached a terminal state.
    Finalized(Event),
    /// Writing the terminal state failed.
    FinalizeFailed(Uuid),
}

/// Verifies the face behind a check-in and records the result.
#[derive(Debug, Clone)]
pub struct CheckinProcessor {
    store: Arc<dyn EventStore>,
    verifier: Arc<dyn FaceVerifier>,
}

impl CheckinProcessor {
    /// Create a processor.
    pub fn new(store: Arc<dyn EventStore>, verifier: Arc<dyn FaceVerifier>) -> Self {
        Self { store, verifier }
    }

    /// The verifier this processor calls.
    pub fn verifier(&self) -> &Arc<dyn FaceVerifier> {
        &self.verifier
    }

    /// Process one message. Never fails; every path is reported in the outcome.
    pub async fn process(&self, message: &Message) -> ProcessOutcome {
        if !message.is_checkin() {
            debug!(message_type = %message.message_type, "Skipping message of unknown type");
            return ProcessOutcome::SkippedUnknownType(message.message_type.clone());
        }

        let Some(event_id) = message.body_str().and_then(|s| Uuid::parse_str(s.trim()).ok())
        else {
            warn!("Dropping check-in message without a valid event id");
            return ProcessOutcome::DroppedInvalidBody;
        };

        let event = match self.store.get_event(event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                warn!(%event_id, "Dropping message for unknown event");
                return ProcessOutcome::DroppedMissingEvent(event_id);
            }
            Err(e) => {
                error!(%event_id, error = %e, "Failed to load event, dropping message");
                return ProcessOutcome::DroppedMissingEvent(event_id);
            }
        };

        if event.is_finalized() {
            debug!(%event_id, status = %event.status, "Event already finalized");
            return ProcessOutcome::SkippedTerminal(event_id);
        }

        let outcome = match self.verifier.verify(&event.image_ref).await {
            Ok(verification) => match EventOutcome::processed(verification.score) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(%event_id, error = %e, "Rejected verifier score");
                    EventOutcome::Failed
                }
            },
            Err(e) => {
                warn!(%event_id, verifier = self.verifier.name(), error = %e, "Face verification failed");
                EventOutcome::Failed
            }
        };

        match self.store.finalize_event(event_id, outcome).await {
            Ok(event) => {
                info!(
                    %event_id,
                    status = %event.status,
                    match_score = ?event.match_score,
                    "Event finalized"
                );
                telemetry::record_event_finalized(event.status.as_str());
                ProcessOutcome::Finalized(event)
            }
            Err(e) => {
                error!(%event_id, error = %e, "Failed to finalize event");
                ProcessOutcome::FinalizeFailed(event_id)
            }
        }
    }
}
