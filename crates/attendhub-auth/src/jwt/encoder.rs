//! JWT token creation with configurable TTLs.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use attendhub_core::config::auth::AuthConfig;
use attendhub_core::error::AppError;
use attendhub_core::traits::clock::Clock;

use super::SIGNING_ALGORITHM;
use super::claims::{Claims, TokenType};

/// Result of a successful token pair generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Issue an access and a refresh token for `subject`, both HS256-signed
/// with `key` and stamped with `now` as issued-at.
pub fn issue(
    subject: &str,
    role: &str,
    issuer: &str,
    key: &[u8],
    access_ttl: Duration,
    refresh_ttl: Duration,
    now: DateTime<Utc>,
) -> Result<TokenPair, AppError> {
    issue_with_key(
        &EncodingKey::from_secret(key),
        subject,
        role,
        issuer,
        access_ttl,
        refresh_ttl,
        now,
    )
}

fn issue_with_key(
    key: &EncodingKey,
    subject: &str,
    role: &str,
    issuer: &str,
    access_ttl: Duration,
    refresh_ttl: Duration,
    now: DateTime<Utc>,
) -> Result<TokenPair, AppError> {
    let access_exp = now + access_ttl;
    let refresh_exp = now + refresh_ttl;
    let header = Header::new(SIGNING_ALGORITHM);

    let claims = |exp: DateTime<Utc>, token_type| Claims {
        sub: subject.to_string(),
        role: role.to_string(),
        iss: issuer.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
        jti: Uuid::new_v4(),
        token_type,
    };

    let access_token = encode(&header, &claims(access_exp, TokenType::Access), key)
        .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;
    let refresh_token = encode(&header, &claims(refresh_exp, TokenType::Refresh), key)
        .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        access_expires_at: access_exp,
        refresh_expires_at: refresh_exp,
    })
}

/// Creates signed JWT access and refresh tokens from configuration.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            access_ttl: Duration::minutes(config.access_ttl_minutes as i64),
            refresh_ttl: Duration::hours(config.refresh_ttl_hours as i64),
            clock,
        }
    }

    /// Generates a new access + refresh token pair.
    pub fn generate_token_pair(&self, subject: &str, role: &str) -> Result<TokenPair, AppError> {
        issue_with_key(
            &self.encoding_key,
            subject,
            role,
            &self.issuer,
            self.access_ttl,
            self.refresh_ttl,
            self.clock.now(),
        )
    }
}
