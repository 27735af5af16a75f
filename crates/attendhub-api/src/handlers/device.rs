//! Device registration handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::request::RegisterDeviceRequest;
use crate::dto::response::TokenResponse;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /v1/devices/register
pub async fn register_device(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterDeviceRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let pair = state.session_service.register(&req.device_id).await?;
    Ok((StatusCode::CREATED, Json(pair.into())))
}
