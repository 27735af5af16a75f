//! Verifier that never leaves the process.

use async_trait::async_trait;

use super::{FaceVerifier, Verification, VerifierError, check_score};

/// Returns a fixed score with one face, or always fails.
#[derive(Debug, Clone)]
pub struct FixtureFaceVerifier {
    score: f64,
    failure: Option<String>,
}

impl FixtureFaceVerifier {
    /// A verifier that scores every image at `score`.
    pub fn new(score: f64) -> Self {
        Self {
            score,
            failure: None,
        }
    }

    /// A verifier whose every call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            failure: Some(reason.into()),
        }
    }
}

#[async_trait]
impl FaceVerifier for FixtureFaceVerifier {
    async fn verify(&self, image_ref: &str) -> Result<Verification, VerifierError> {
        if let Some(reason) = &self.failure {
            return Err(VerifierError::Unavailable(reason.clone()));
        }
        if image_ref.trim().is_empty() {
            return Err(VerifierError::EmptyImageRef);
        }
        Ok(Verification {
            score: check_score(self.score)?,
            faces_detected: 1,
        })
    }

    async fn health(&self) -> Result<(), VerifierError> {
        match &self.failure {
            Some(reason) => Err(VerifierError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
