//! Check-in event repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use attendhub_core::error::{AppError, ErrorKind};
use attendhub_core::result::AppResult;
use attendhub_entity::event::{Event, EventOutcome, EventQuery, NewEvent};

const FIND_RECENT_SQL: &str = "SELECT * FROM attendance_events \
     WHERE user_id = $1 AND device_id = $2 AND occurred_at >= $3 AND occurred_at <= $4 \
     ORDER BY occurred_at DESC LIMIT 1";

/// Repository for the `attendance_events` table.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>> {
        sqlx::query_as::<_, Event>("SELECT * FROM attendance_events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find event", e))
    }

    /// Insert a pending event unless the pair already has one in
    /// `[since, new_event.occurred_at]`.
    ///
    /// A transaction-scoped advisory lock on the pair serializes concurrent
    /// submissions, so at most one of them inserts. Returns the stored event
    /// and whether it was created by this call.
    pub async fn insert_unless_recent(
        &self,
        new_event: NewEvent,
        since: DateTime<Utc>,
    ) -> AppResult<(Event, bool)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(pair_lock_key(&new_event.user_id, &new_event.device_id))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to lock check-in pair", e)
            })?;

        let existing = sqlx::query_as::<_, Event>(FIND_RECENT_SQL)
            .bind(&new_event.user_id)
            .bind(&new_event.device_id)
            .bind(since)
            .bind(new_event.occurred_at)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find recent event", e)
            })?;

        if let Some(event) = existing {
            tx.commit().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
            })?;
            return Ok((event, false));
        }

        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO attendance_events \
             (id, user_id, device_id, occurred_at, location, image_ref, status, match_score, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 'pending', NULL, $4) RETURNING *",
        )
        .bind(new_event.id)
        .bind(&new_event.user_id)
        .bind(&new_event.device_id)
        .bind(new_event.occurred_at)
        .bind(&new_event.location)
        .bind(&new_event.image_ref)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| super::map_write_error("Failed to create event", &new_event.device_id, e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        Ok((event, true))
    }

    /// Move a pending event to its terminal state.
    ///
    /// Fails with `NotFound` for an unknown id and `Conflict` if the event
    /// was already finalized; the row is left unchanged in both cases.
    pub async fn finalize(&self, id: Uuid, outcome: EventOutcome) -> AppResult<Event> {
        let updated = sqlx::query_as::<_, Event>(
            "UPDATE attendance_events SET status = $2, match_score = $3 \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(outcome.status())
        .bind(outcome.match_score())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to finalize event", e))?;

        match updated {
            Some(event) => Ok(event),
            None => match self.find_by_id(id).await? {
                Some(event) => Err(AppError::conflict(format!(
                    "Event {id} is already {}",
                    event.status
                ))),
                None => Err(AppError::not_found(format!("Event {id} not found"))),
            },
        }
    }

    /// List events newest first.
    pub async fn list(&self, query: &EventQuery) -> AppResult<Vec<Event>> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM attendance_events \
             WHERE ($1::text IS NULL OR device_id = $1) \
               AND ($2::text IS NULL OR user_id = $2) \
             ORDER BY occurred_at DESC, id \
             LIMIT $3 OFFSET $4",
        )
        .bind(query.device_filter())
        .bind(query.user_filter())
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list events", e))
    }
}

/// Advisory lock key for a user/device pair. Hash collisions only
/// over-serialize unrelated pairs.
fn pair_lock_key(user_id: &str, device_id: &str) -> String {
    format!("checkin:{user_id}\u{1f}{device_id}")
}
