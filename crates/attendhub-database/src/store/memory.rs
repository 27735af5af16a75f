//! In-memory event store.
//!
//! Used for single-process deployments and tests. All state lives behind
//! one `RwLock`, which also makes the deduplicating insert atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use attendhub_core::error::AppError;
use attendhub_core::result::AppResult;
use attendhub_entity::device::Device;
use attendhub_entity::event::{Event, EventOutcome, EventQuery, NewEvent};
use attendhub_entity::token::RefreshToken;

use super::{EventInsert, EventStore};

#[derive(Debug, Default)]
struct Tables {
    devices: HashMap<String, Device>,
    tokens: HashMap<String, RefreshToken>,
    events: HashMap<Uuid, Event>,
}

impl Tables {
    fn require_device(&self, device_id: &str) -> AppResult<()> {
        if self.devices.contains_key(device_id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "Device '{device_id}' is not registered"
            )))
        }
    }

    fn find_recent(
        &self,
        user_id: &str,
        device_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Option<&Event> {
        self.events
            .values()
            .filter(|e| e.user_id == user_id && e.device_id == device_id)
            .filter(|e| e.occurred_at >= since && e.occurred_at <= until)
            .max_by_key(|e| e.occurred_at)
    }
}

/// Process-local [`EventStore`]. State is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    tables: RwLock<Tables>,
}

impl MemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn upsert_device(&self, device_id: &str, now: DateTime<Utc>) -> AppResult<Device> {
        let mut tables = self.tables.write().await;
        let device = tables
            .devices
            .entry(device_id.to_string())
            .or_insert_with(|| Device {
                device_id: device_id.to_string(),
                created_at: now,
            });
        Ok(device.clone())
    }

    async fn find_device(&self, device_id: &str) -> AppResult<Option<Device>> {
        Ok(self.tables.read().await.devices.get(device_id).cloned())
    }

    async fn save_refresh_token(&self, token: &RefreshToken) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_device(&token.device_id)?;
        if tables.tokens.contains_key(&token.token) {
            return Err(AppError::conflict("Refresh token already stored"));
        }
        tables.tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        Ok(self.tables.read().await.tokens.get(token).cloned())
    }

    async fn revoke_refresh_token(&self, token: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.tokens.get_mut(token) {
            Some(stored) if !stored.revoked => {
                stored.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_event_unless_recent(
        &self,
        new_event: NewEvent,
        since: DateTime<Utc>,
    ) -> AppResult<EventInsert> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.find_recent(
            &new_event.user_id,
            &new_event.device_id,
            since,
            new_event.occurred_at,
        ) {
            return Ok(EventInsert {
                event: existing.clone(),
                created: false,
            });
        }

        tables.require_device(&new_event.device_id)?;
        if tables.events.contains_key(&new_event.id) {
            return Err(AppError::conflict(format!(
                "Event {} already exists",
                new_event.id
            )));
        }
        let event = new_event.into_pending();
        tables.events.insert(event.id, event.clone());
        Ok(EventInsert {
            event,
            created: true,
        })
    }

    async fn get_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn finalize_event(&self, id: Uuid, outcome: EventOutcome) -> AppResult<Event> {
        let mut tables = self.tables.write().await;
        let event = tables
            .events
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Event {id} not found")))?;
        if event.is_finalized() {
            return Err(AppError::conflict(format!(
                "Event {id} is already {}",
                event.status
            )));
        }
        event.status = outcome.status();
        event.match_score = outcome.match_score();
        Ok(event.clone())
    }

    async fn list_events(&self, query: &EventQuery) -> AppResult<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(a.id.cmp(&b.id)));

        Ok(events
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendhub_core::error::ErrorKind;
    use attendhub_entity::event::EventStatus;
    use chrono::Duration;

    fn new_event(user: &str, device: &str, at: DateTime<Utc>) -> NewEvent {
        NewEvent {
            id: Uuid::new_v4(),
            user_id: user.to_string(),
            device_id: device.to_string(),
            occurred_at: at,
            location: Some("lobby".to_string()),
            image_ref: "https://img.example/1.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_device_is_idempotent() {
        let store = MemoryEventStore::new();
        let first_seen = Utc::now();
        let first = store.upsert_device("kiosk-1", first_seen).await.unwrap();
        let again = store
            .upsert_device("kiosk-1", first_seen + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(first, again);
        assert_eq!(again.created_at, first_seen);
    }

    #[tokio::test]
    async fn test_find_device() {
        let store = MemoryEventStore::new();
        assert!(store.find_device("kiosk-1").await.unwrap().is_none());

        let registered = store.upsert_device("kiosk-1", Utc::now()).await.unwrap();
        let found = store.find_device("kiosk-1").await.unwrap();
        assert_eq!(found, Some(registered));
    }

    #[tokio::test]
    async fn test_event_requires_registered_device() {
        let store = MemoryEventStore::new();
        let now = Utc::now();
        let err = store
            .insert_event_unless_recent(new_event("emp-42", "ghost", now), now)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_insert_unless_recent_collapses_within_window() {
        let store = MemoryEventStore::new();
        let now = Utc::now();
        store.upsert_device("kiosk-1", now).await.unwrap();

        let first = store
            .insert_event_unless_recent(new_event("emp-42", "kiosk-1", now), now - Duration::minutes(5))
            .await
            .unwrap();
        assert!(first.created);

        let later = now + Duration::minutes(1);
        let second = store
            .insert_event_unless_recent(
                new_event("emp-42", "kiosk-1", later),
                later - Duration::minutes(5),
            )
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.event.id, first.event.id);

        let other_user = store
            .insert_event_unless_recent(
                new_event("emp-7", "kiosk-1", later),
                later - Duration::minutes(5),
            )
            .await
            .unwrap();
        assert!(other_user.created);
    }

    #[tokio::test]
    async fn test_finalize_is_monotone() {
        let store = MemoryEventStore::new();
        let now = Utc::now();
        store.upsert_device("kiosk-1", now).await.unwrap();
        let id = store
            .insert_event_unless_recent(new_event("emp-42", "kiosk-1", now), now)
            .await
            .unwrap()
            .event
            .id;

        let processed = store
            .finalize_event(id, EventOutcome::processed(0.95).unwrap())
            .await
            .unwrap();
        assert_eq!(processed.status, EventStatus::Processed);
        assert_eq!(processed.match_score, Some(0.95));

        let err = store
            .finalize_event(id, EventOutcome::Failed)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let stored = store.get_event(id).await.unwrap().unwrap();
        assert_eq!(stored.status, EventStatus::Processed);
        assert_eq!(stored.match_score, Some(0.95));

        let missing = store
            .finalize_event(Uuid::new_v4(), EventOutcome::Failed)
            .await
            .unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_filters_orders_and_pages() {
        let store = MemoryEventStore::new();
        let base = Utc::now();
        store.upsert_device("kiosk-1", base).await.unwrap();
        store.upsert_device("kiosk-2", base).await.unwrap();

        for i in 0..3 {
            let at = base + Duration::minutes(10 * i);
            store
                .insert_event_unless_recent(new_event("emp-42", "kiosk-1", at), at)
                .await
                .unwrap();
        }
        store
            .insert_event_unless_recent(new_event("emp-42", "kiosk-2", base), base)
            .await
            .unwrap();

        let all = store.list_events(&EventQuery::default()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].occurred_at >= w[1].occurred_at));

        let kiosk_one = EventQuery {
            device_id: Some("kiosk-1".to_string()),
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        };
        let page = store.list_events(&kiosk_one).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|e| e.device_id == "kiosk-1"));
        assert_eq!(page[0].occurred_at, base + Duration::minutes(10));
    }

    #[tokio::test]
    async fn test_refresh_token_revocation_flips_once() {
        let store = MemoryEventStore::new();
        let now = Utc::now();
        store.upsert_device("kiosk-1", now).await.unwrap();
        let token = RefreshToken::new("tok", "kiosk-1", now + Duration::hours(24), now);
        store.save_refresh_token(&token).await.unwrap();

        assert!(store.revoke_refresh_token("tok").await.unwrap());
        assert!(!store.revoke_refresh_token("tok").await.unwrap());
        assert!(!store.revoke_refresh_token("unknown").await.unwrap());
        assert!(store.find_refresh_token("tok").await.unwrap().unwrap().revoked);
    }
}
