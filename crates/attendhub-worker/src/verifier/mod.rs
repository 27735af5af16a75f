//! Face verifier contract and variant selection.

pub mod fixture;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use attendhub_core::config::face::{FaceConfig, MODE_FIXTURE, MODE_HTTP};
use attendhub_core::error::{AppError, ErrorKind};
use attendhub_core::result::AppResult;

pub use fixture::FixtureFaceVerifier;
pub use http::HttpFaceVerifier;

/// Result of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verification {
    /// Match confidence in `[0, 1]`.
    pub score: f64,
    /// Number of faces the service found.
    pub faces_detected: u32,
}

/// Why a verification did not produce a usable score.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// The event carried no image reference.
    #[error("image reference is empty")]
    EmptyImageRef,

    /// The service could not be reached or timed out.
    #[error("face service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("face service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The image contained no face.
    #[error("no face detected in image")]
    NoFace,

    /// The service reported a score outside `[0, 1]`.
    #[error("face service returned out-of-range score {0}")]
    ScoreOutOfRange(f64),

    /// Verification failure injected by a test double.
    #[error("verification unavailable: {0}")]
    Unavailable(String),
}

impl From<VerifierError> for AppError {
    fn from(err: VerifierError) -> Self {
        AppError::with_source(ErrorKind::ExternalService, "Face verification failed", err)
    }
}

/// External face matching collaborator.
#[async_trait]
pub trait FaceVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Score the face found at `image_ref`.
    async fn verify(&self, image_ref: &str) -> Result<Verification, VerifierError>;

    /// Check that the collaborator is reachable.
    async fn health(&self) -> Result<(), VerifierError>;

    /// Variant name for logs.
    fn name(&self) -> &'static str;
}

/// Reject a score outside `[0, 1]`.
pub(crate) fn check_score(score: f64) -> Result<f64, VerifierError> {
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(VerifierError::ScoreOutOfRange(score))
    }
}

/// Build the verifier variant named by `face.mode`.
pub fn build_verifier(config: &FaceConfig) -> AppResult<Arc<dyn FaceVerifier>> {
    let verifier: Arc<dyn FaceVerifier> = match config.mode.as_str() {
        MODE_HTTP => Arc::new(HttpFaceVerifier::new(&config.base_url, config.timeout())?),
        MODE_FIXTURE => Arc::new(FixtureFaceVerifier::new(config.fixture_score)),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown face verifier mode '{other}'"
            )));
        }
    };
    info!(mode = verifier.name(), "Face verifier selected");
    Ok(verifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_verifier_by_mode() {
        let fixture = build_verifier(&FaceConfig::default()).unwrap();
        assert_eq!(fixture.name(), "fixture");

        let http = build_verifier(&FaceConfig {
            mode: MODE_HTTP.to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(http.name(), "http");

        let err = build_verifier(&FaceConfig {
            mode: "grpc".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_check_score_bounds() {
        assert_eq!(check_score(0.0).unwrap(), 0.0);
        assert_eq!(check_score(1.0).unwrap(), 1.0);
        assert!(matches!(
            check_score(1.2),
            Err(VerifierError::ScoreOutOfRange(_))
        ));
        assert!(check_score(f64::NAN).is_err());
    }
}
