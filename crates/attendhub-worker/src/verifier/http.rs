//! Face service client over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use attendhub_core::error::{AppError, ErrorKind};
use attendhub_core::result::AppResult;

use super::{FaceVerifier, Verification, VerifierError, check_score};

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    image_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Vec<f32>,
    score: f64,
    #[serde(default)]
    faces_detected: u32,
}

/// Calls `POST {base}/embed` and `GET {base}/health`.
#[derive(Debug, Clone)]
pub struct HttpFaceVerifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFaceVerifier {
    /// Create a client for the service at `base_url`. `timeout` bounds each request.
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The service base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, VerifierError> {
    let status = response.status();
    if status.as_u16() < 300 {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(VerifierError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl FaceVerifier for HttpFaceVerifier {
    async fn verify(&self, image_ref: &str) -> Result<Verification, VerifierError> {
        if image_ref.trim().is_empty() {
            return Err(VerifierError::EmptyImageRef);
        }

        let response = self
            .client
            .post(format!("{}/embed", self.base_url))
            .json(&EmbedRequest {
                image_url: image_ref,
            })
            .send()
            .await?;
        let embed: EmbedResponse = error_for_status(response).await?.json().await?;

        if embed.embedding.is_empty() || embed.faces_detected == 0 {
            return Err(VerifierError::NoFace);
        }
        let score = check_score(embed.score)?;
        debug!(
            score,
            faces = embed.faces_detected,
            dimensions = embed.embedding.len(),
            "Face service scored image"
        );

        Ok(Verification {
            score,
            faces_detected: embed.faces_detected,
        })
    }

    async fn health(&self) -> Result<(), VerifierError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        error_for_status(response).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
