//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use attendhub_entity::event::EventQuery;
use attendhub_service::checkin::CheckinRequest;

/// Device registration body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterDeviceRequest {
    /// Device identifier.
    #[validate(length(min = 1, max = 128, message = "device_id is required"))]
    pub device_id: String,
}

/// Token refresh or revoke body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

/// Check-in submission body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCheckinRequest {
    /// The person checking in.
    #[validate(length(min = 1, max = 128, message = "user_id is required"))]
    pub user_id: String,
    /// The capturing device; must match the token subject.
    #[validate(length(min = 1, max = 128, message = "device_id is required"))]
    pub device_id: String,
    /// Optional location label.
    #[validate(length(max = 256))]
    pub location: Option<String>,
    /// Reference to the captured image.
    #[validate(length(min = 1, max = 2048, message = "image_ref is required"))]
    pub image_ref: String,
}

impl From<CreateCheckinRequest> for CheckinRequest {
    fn from(req: CreateCheckinRequest) -> Self {
        Self {
            user_id: req.user_id,
            device_id: req.device_id,
            location: req.location,
            image_ref: req.image_ref,
        }
    }
}

/// Query string for event listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEventsParams {
    /// Restrict to one device.
    pub device_id: Option<String>,
    /// Restrict to one user.
    pub user_id: Option<String>,
    /// Page size.
    pub limit: Option<i64>,
    /// Rows to skip.
    pub offset: Option<i64>,
}

impl From<ListEventsParams> for EventQuery {
    fn from(params: ListEventsParams) -> Self {
        Self {
            device_id: params.device_id,
            user_id: params.user_id,
            limit: params.limit,
            offset: params.offset,
        }
    }
}
