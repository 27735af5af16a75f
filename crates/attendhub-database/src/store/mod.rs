//! The event store abstraction and backend selection.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use attendhub_core::config::database::{self, DatabaseConfig};
use attendhub_core::error::AppError;
use attendhub_core::result::AppResult;
use attendhub_entity::device::Device;
use attendhub_entity::event::{Event, EventOutcome, EventQuery, NewEvent};
use attendhub_entity::token::RefreshToken;

pub use memory::MemoryEventStore;
pub use postgres::PgEventStore;

use crate::connection::DatabasePool;
use crate::migration;

/// Result of a deduplicating insert.
#[derive(Debug, Clone, PartialEq)]
pub struct EventInsert {
    /// The stored event: newly created, or the earlier one it collapsed onto.
    pub event: Event,
    /// `true` if this call created `event`.
    pub created: bool,
}

/// Persistence for devices, refresh tokens and check-in events.
///
/// Implementations enforce the entity invariants: devices and tokens are
/// never deleted, an event is finalized at most once, and a match score
/// exists only on processed events.
#[async_trait]
pub trait EventStore: Send + Sync + std::fmt::Debug + 'static {
    /// Register a device if absent; returns the stored device either way.
    async fn upsert_device(&self, device_id: &str, now: DateTime<Utc>) -> AppResult<Device>;

    /// Look up a device.
    async fn find_device(&self, device_id: &str) -> AppResult<Option<Device>>;

    /// Persist a newly issued refresh token. The owning device must exist.
    async fn save_refresh_token(&self, token: &RefreshToken) -> AppResult<()>;

    /// Look up a refresh token by value.
    async fn find_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>>;

    /// Revoke a token. Returns `true` only if this call flipped it.
    async fn revoke_refresh_token(&self, token: &str) -> AppResult<bool>;

    /// Atomically look for a recent event for the pair in
    /// `[since, new_event.occurred_at]` and insert `new_event` as pending
    /// only if there is none.
    async fn insert_event_unless_recent(
        &self,
        new_event: NewEvent,
        since: DateTime<Utc>,
    ) -> AppResult<EventInsert>;

    /// Fetch an event.
    async fn get_event(&self, id: Uuid) -> AppResult<Option<Event>>;

    /// Write the terminal state of a pending event.
    ///
    /// `NotFound` for unknown ids, `Conflict` if already finalized.
    async fn finalize_event(&self, id: Uuid, outcome: EventOutcome) -> AppResult<Event>;

    /// List events newest first.
    async fn list_events(&self, query: &EventQuery) -> AppResult<Vec<Event>>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Short backend identifier for logs.
    fn backend_name(&self) -> &'static str;
}

/// Build the configured store, connecting and migrating Postgres if selected.
pub async fn connect_event_store(config: &DatabaseConfig) -> AppResult<Arc<dyn EventStore>> {
    match config.provider.as_str() {
        database::PROVIDER_MEMORY => {
            info!("Using in-memory event store; data is lost on restart");
            Ok(Arc::new(MemoryEventStore::new()))
        }
        database::PROVIDER_POSTGRES => {
            let pool = DatabasePool::connect(config).await?;
            if config.auto_migrate {
                migration::run_migrations(pool.pool()).await?;
            }
            Ok(Arc::new(PgEventStore::new(pool.into_pool())))
        }
        other => Err(AppError::configuration(format!(
            "Unknown database provider '{other}'"
        ))),
    }
}
