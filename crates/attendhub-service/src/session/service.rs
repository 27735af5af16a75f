//! Device token issuing, refresh rotation and revocation.

use std::sync::Arc;

use tracing::{info, warn};

use attendhub_auth::jwt::{DEVICE_ROLE, JwtDecoder, JwtEncoder, TokenPair};
use attendhub_core::error::AppError;
use attendhub_core::result::AppResult;
use attendhub_core::traits::clock::Clock;
use attendhub_database::store::EventStore;
use attendhub_entity::token::RefreshToken;

use crate::checkin::CheckinService;

/// Issues device tokens and persists refresh tokens.
#[derive(Debug, Clone)]
pub struct DeviceSessionService {
    /// Device registration.
    checkins: Arc<CheckinService>,
    /// Refresh token persistence.
    store: Arc<dyn EventStore>,
    /// JWT encoder.
    encoder: Arc<JwtEncoder>,
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
    /// Time source for refresh token expiry checks.
    clock: Arc<dyn Clock>,
}

impl DeviceSessionService {
    /// Creates a new session service.
    pub fn new(
        checkins: Arc<CheckinService>,
        store: Arc<dyn EventStore>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            checkins,
            store,
            encoder,
            decoder,
            clock,
        }
    }

    /// Registers a device (idempotently) and issues it a fresh token pair.
    pub async fn register(&self, device_id: &str) -> AppResult<TokenPair> {
        let device = self.checkins.register_device(device_id).await?;
        let pair = self.issue_for(&device.device_id).await?;
        info!(device_id = %device.device_id, "Issued device tokens");
        Ok(pair)
    }

    /// Exchanges a refresh token for a new pair. The presented token is
    /// revoked; presenting it again fails.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.decoder.decode_refresh_token(refresh_token)?;

        let stored = self
            .store
            .find_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| AppError::authentication("refresh token not recognized"))?;
        if stored.device_id != claims.sub {
            warn!(device_id = %claims.sub, "Refresh token presented for a different device");
            return Err(AppError::authentication("refresh token not recognized"));
        }
        if !stored.is_usable(self.clock.now()) {
            return Err(AppError::authentication("refresh token revoked or expired"));
        }
        if !self.store.revoke_refresh_token(refresh_token).await? {
            // Lost a race with a concurrent refresh of the same token.
            return Err(AppError::authentication("refresh token revoked or expired"));
        }

        let pair = self.issue_for(&stored.device_id).await?;
        info!(device_id = %stored.device_id, "Rotated device tokens");
        Ok(pair)
    }

    /// Revokes a refresh token. Unknown or already revoked tokens are ignored.
    pub async fn revoke(&self, refresh_token: &str) -> AppResult<()> {
        if self.store.revoke_refresh_token(refresh_token).await? {
            info!("Refresh token revoked");
        }
        Ok(())
    }

    async fn issue_for(&self, device_id: &str) -> AppResult<TokenPair> {
        let pair = self.encoder.generate_token_pair(device_id, DEVICE_ROLE)?;
        let record = RefreshToken::new(
            pair.refresh_token.clone(),
            device_id,
            pair.refresh_expires_at,
            self.clock.now(),
        );
        self.store.save_refresh_token(&record).await?;
        Ok(pair)
    }
}
