//! Face verifier collaborator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Call the face service over HTTP.
pub const MODE_HTTP: &str = "http";
/// Return a fixed score without any network call.
pub const MODE_FIXTURE: &str = "fixture";

/// Face verifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceConfig {
    /// Verifier variant: `"http"` or `"fixture"`.
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Base URL of the face service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Score returned by the fixture variant.
    #[serde(default = "default_fixture_score")]
    pub fixture_score: f64,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            fixture_score: default_fixture_score(),
        }
    }
}

impl FaceConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_mode() -> String {
    MODE_FIXTURE.to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_fixture_score() -> f64 {
    0.95
}
