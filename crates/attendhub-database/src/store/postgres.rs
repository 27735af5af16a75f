//! PostgreSQL event store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use attendhub_core::result::AppResult;
use attendhub_entity::device::Device;
use attendhub_entity::event::{Event, EventOutcome, EventQuery, NewEvent};
use attendhub_entity::token::RefreshToken;

use super::{EventInsert, EventStore};
use crate::connection;
use crate::repositories::{DeviceRepository, EventRepository, RefreshTokenRepository};

/// [`EventStore`] backed by the PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
    devices: DeviceRepository,
    tokens: RefreshTokenRepository,
    events: EventRepository,
}

impl PgEventStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            devices: DeviceRepository::new(pool.clone()),
            tokens: RefreshTokenRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn upsert_device(&self, device_id: &str, now: DateTime<Utc>) -> AppResult<Device> {
        self.devices.upsert(device_id, now).await
    }

    async fn find_device(&self, device_id: &str) -> AppResult<Option<Device>> {
        self.devices.find_by_id(device_id).await
    }

    async fn save_refresh_token(&self, token: &RefreshToken) -> AppResult<()> {
        self.tokens.create(token).await
    }

    async fn find_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        self.tokens.find_by_token(token).await
    }

    async fn revoke_refresh_token(&self, token: &str) -> AppResult<bool> {
        self.tokens.revoke(token).await
    }

    async fn insert_event_unless_recent(
        &self,
        new_event: NewEvent,
        since: DateTime<Utc>,
    ) -> AppResult<EventInsert> {
        let (event, created) = self.events.insert_unless_recent(new_event, since).await?;
        Ok(EventInsert { event, created })
    }

    async fn get_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        self.events.find_by_id(id).await
    }

    async fn finalize_event(&self, id: Uuid, outcome: EventOutcome) -> AppResult<Event> {
        self.events.finalize(id, outcome).await
    }

    async fn list_events(&self, query: &EventQuery) -> AppResult<Vec<Event>> {
        self.events.list(query).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        connection::ping(&self.pool).await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
