//! JWT token validation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};

use attendhub_core::config::auth::AuthConfig;
use attendhub_core::traits::clock::Clock;

use super::SIGNING_ALGORITHM;
use super::claims::{Claims, TokenType};
use super::error::TokenError;

/// Validate `token` against `key` and `issuer` at instant `now`.
///
/// Checks, in order: the header algorithm is exactly HS256, the signature
/// verifies, the issuer matches, and the token has not expired.
pub fn parse(
    token: &str,
    key: &[u8],
    issuer: &str,
    now: DateTime<Utc>,
) -> Result<Claims, TokenError> {
    parse_with_key(token, &DecodingKey::from_secret(key), issuer, now)
}

fn parse_with_key(
    token: &str,
    key: &DecodingKey,
    issuer: &str,
    now: DateTime<Utc>,
) -> Result<Claims, TokenError> {
    let header = decode_header(token).map_err(|_| TokenError::Malformed)?;
    if header.alg != SIGNING_ALGORITHM {
        return Err(TokenError::WrongAlgorithm);
    }

    let mut validation = Validation::new(SIGNING_ALGORITHM);
    // Expiry is checked below against the injected clock.
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let claims = decode::<Claims>(token, key, &validation)
        .map_err(|e| match e.kind() {
            JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
            JwtErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
            JwtErrorKind::InvalidAlgorithm => TokenError::WrongAlgorithm,
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?
        .claims;

    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

/// Validates JWT tokens using configured key, issuer and clock.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    issuer: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            clock,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_typed(token, TokenType::Access)
    }

    /// Decodes and validates a refresh token string.
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_typed(token, TokenType::Refresh)
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = parse_with_key(token, &self.decoding_key, &self.issuer, self.clock.now())?;
        if claims.token_type != expected {
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }
}
