//! Token validation failures.

use thiserror::Error;

use attendhub_core::error::{AppError, ErrorKind};

/// Why a token was rejected. Callers never receive claims alongside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a well-formed JWT, missing claims, or the wrong token type.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not verify under the configured key.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The `exp` claim is not in the future.
    #[error("token has expired")]
    Expired,
    /// The `iss` claim names a different issuer.
    #[error("token issuer mismatch")]
    IssuerMismatch,
    /// The header names an algorithm other than HS256.
    #[error("token is signed with an unexpected algorithm")]
    WrongAlgorithm,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::with_source(ErrorKind::Authentication, "invalid token", err)
    }
}
