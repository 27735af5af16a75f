//! Refresh token repository implementation.

use sqlx::PgPool;

use attendhub_core::error::{AppError, ErrorKind};
use attendhub_core::result::AppResult;
use attendhub_entity::token::RefreshToken;

/// Repository for the `refresh_tokens` table.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a newly issued token.
    pub async fn create(&self, token: &RefreshToken) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, device_id, expires_at, revoked, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&token.token)
        .bind(&token.device_id)
        .bind(token.expires_at)
        .bind(token.revoked)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| super::map_write_error("Failed to save refresh token", &token.device_id, e))?;
        Ok(())
    }

    /// Find a token by its string value.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
            })
    }

    /// Flip `revoked`. Returns `true` only for the call that performed the flip.
    pub async fn revoke(&self, token: &str) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE token = $1 AND revoked = FALSE")
                .bind(token)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to revoke refresh token", e)
                })?;
        Ok(result.rows_affected() == 1)
    }
}
