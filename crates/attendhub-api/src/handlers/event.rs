//! Event read handlers.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use attendhub_core::error::AppError;
use attendhub_entity::event::Event;

use crate::dto::request::ListEventsParams;
use crate::dto::response::EventListResponse;
use crate::error::ApiError;
use crate::extractors::DeviceAuth;
use crate::state::AppState;

/// GET /v1/events
pub async fn list_events(
    State(state): State<AppState>,
    _auth: DeviceAuth,
    params: Result<Query<ListEventsParams>, QueryRejection>,
) -> Result<Json<EventListResponse>, ApiError> {
    let Query(params) = params.map_err(|e| AppError::validation(e.body_text()))?;
    let events = state.checkin_service.list_events(&params.into()).await?;
    Ok(Json(EventListResponse { events }))
}

/// GET /v1/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    _auth: DeviceAuth,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::not_found(format!("Event {id} not found")))?;
    let event = state.checkin_service.get_event(id).await?;
    Ok(Json(event))
}
