//! Token refresh and revocation handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::request::RefreshTokenRequest;
use crate::dto::response::TokenResponse;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let pair = state.session_service.refresh(&req.refresh_token).await?;
    Ok(Json(pair.into()))
}

/// POST /v1/auth/revoke
pub async fn revoke(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<StatusCode, ApiError> {
    state.session_service.revoke(&req.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
