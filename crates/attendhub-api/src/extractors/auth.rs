//! `DeviceAuth` extractor: pulls the bearer token from the Authorization
//! header and validates it as a device access token.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use attendhub_auth::jwt::{Claims, DEVICE_ROLE};
use attendhub_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated device behind a request.
#[derive(Debug, Clone)]
pub struct DeviceAuth(pub Claims);

impl DeviceAuth {
    /// The device the token was issued to.
    pub fn device_id(&self) -> &str {
        self.0.device_id()
    }
}

/// Extract the token from a `Bearer <token>` header value. The scheme is
/// case-insensitive.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for DeviceAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = bearer_token(header)
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state
            .jwt_decoder
            .decode_access_token(token)
            .map_err(AppError::from)?;

        if claims.role != DEVICE_ROLE {
            return Err(AppError::authorization("Token is not a device token").into());
        }

        Ok(DeviceAuth(claims))
    }
}
