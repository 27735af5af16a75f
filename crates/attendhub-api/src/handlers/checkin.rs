//! Check-in submission handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::error;

use attendhub_core::error::AppError;
use attendhub_core::telemetry;
use attendhub_core::types::Message;

use crate::dto::request::CreateCheckinRequest;
use crate::dto::response::CheckinAccepted;
use crate::error::ApiError;
use crate::extractors::{DeviceAuth, ValidatedJson};
use crate::state::AppState;

/// POST /v1/checkins
///
/// Answers 202 with the new event, or with the earlier event when the
/// submission falls inside the dedup window. Only new events are queued.
pub async fn create_checkin(
    State(state): State<AppState>,
    auth: DeviceAuth,
    ValidatedJson(req): ValidatedJson<CreateCheckinRequest>,
) -> Result<(StatusCode, Json<CheckinAccepted>), ApiError> {
    if auth.device_id() != req.device_id {
        return Err(AppError::authorization("device_id does not match the authenticated device").into());
    }

    let outcome = state.checkin_service.check_in(req.into()).await?;
    telemetry::record_checkin(outcome.created);

    if outcome.created {
        let event_id = outcome.event.id;
        if let Err(e) = state
            .queue
            .publish(Message::checkin(event_id), &state.shutdown)
            .await
        {
            error!(%event_id, error = %e, "Failed to queue check-in, event stays pending");
            telemetry::record_publish_failure();
        }
    }

    Ok((StatusCode::ACCEPTED, Json(CheckinAccepted::from(&outcome.event))))
}
