//! Check-in ingestion service.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use attendhub_core::config::checkin::CheckinConfig;
use attendhub_core::error::AppError;
use attendhub_core::result::AppResult;
use attendhub_core::traits::clock::Clock;
use attendhub_database::store::EventStore;
use attendhub_entity::device::Device;
use attendhub_entity::event::{Event, EventQuery, NewEvent};

/// A check-in submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRequest {
    /// The person checking in.
    pub user_id: String,
    /// The capturing device.
    pub device_id: String,
    /// Optional location label.
    pub location: Option<String>,
    /// Reference to the captured image.
    pub image_ref: String,
}

/// What a check-in call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinOutcome {
    /// The new event, or the earlier one inside the dedup window.
    pub event: Event,
    /// `true` if `event` was created by this call. Only created events
    /// should be published to the queue.
    pub created: bool,
}

/// Registers devices and turns check-in submissions into pending events.
#[derive(Debug, Clone)]
pub struct CheckinService {
    /// Event store.
    store: Arc<dyn EventStore>,
    /// Time source for `occurred_at` and the window bounds.
    clock: Arc<dyn Clock>,
    /// Repeated check-ins for a pair inside this window collapse.
    dedup_window: Duration,
}

impl CheckinService {
    /// Creates a new check-in service.
    pub fn new(store: Arc<dyn EventStore>, clock: Arc<dyn Clock>, dedup_window: Duration) -> Self {
        Self {
            store,
            clock,
            dedup_window,
        }
    }

    /// Creates a service using the dedup window from `config`.
    pub fn from_config(
        store: Arc<dyn EventStore>,
        clock: Arc<dyn Clock>,
        config: &CheckinConfig,
    ) -> AppResult<Self> {
        let dedup_window = Duration::from_std(config.dedup_window()).map_err(|_| {
            AppError::configuration("checkin.dedup_window_seconds is out of range")
        })?;
        Ok(Self::new(store, clock, dedup_window))
    }

    /// The configured dedup window.
    pub fn dedup_window(&self) -> Duration {
        self.dedup_window
    }

    /// Registers a device. Registering an existing device is a no-op that
    /// returns the stored device.
    pub async fn register_device(&self, device_id: &str) -> AppResult<Device> {
        if device_id.trim().is_empty() {
            return Err(AppError::validation("device_id is required"));
        }

        let device = self.store.upsert_device(device_id, self.clock.now()).await?;
        debug!(device_id = %device.device_id, "Device registered");
        Ok(device)
    }

    /// Accepts a check-in.
    ///
    /// If the same user already checked in on the same device within the
    /// dedup window, that event is returned unchanged with `created = false`.
    /// Otherwise a pending event stamped with the current time is persisted.
    /// Publishing the new event id is the caller's job.
    pub async fn check_in(&self, request: CheckinRequest) -> AppResult<CheckinOutcome> {
        if request.user_id.trim().is_empty() {
            return Err(AppError::validation("user_id is required"));
        }
        if request.device_id.trim().is_empty() {
            return Err(AppError::validation("device_id is required"));
        }

        let now = self.clock.now();
        let new_event = NewEvent {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            device_id: request.device_id,
            occurred_at: now,
            location: request.location.filter(|l| !l.trim().is_empty()),
            image_ref: request.image_ref,
        };

        let inserted = self
            .store
            .insert_event_unless_recent(new_event, now - self.dedup_window)
            .await?;

        if inserted.created {
            info!(
                event_id = %inserted.event.id,
                user_id = %inserted.event.user_id,
                device_id = %inserted.event.device_id,
                "Check-in accepted"
            );
        } else {
            info!(
                event_id = %inserted.event.id,
                user_id = %inserted.event.user_id,
                device_id = %inserted.event.device_id,
                "Duplicate check-in collapsed onto existing event"
            );
        }

        Ok(CheckinOutcome {
            event: inserted.event,
            created: inserted.created,
        })
    }

    /// Fetches one event.
    pub async fn get_event(&self, id: Uuid) -> AppResult<Event> {
        self.store
            .get_event(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Event {id} not found")))
    }

    /// Lists events newest first.
    pub async fn list_events(&self, query: &EventQuery) -> AppResult<Vec<Event>> {
        self.store.list_events(query).await
    }
}
