//! Check-in ingestion configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Check-in ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinConfig {
    /// Repeated check-ins for the same user and device inside this window
    /// collapse onto the first event.
    #[serde(default = "default_dedup_window")]
    pub dedup_window_seconds: u64,
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            dedup_window_seconds: default_dedup_window(),
        }
    }
}

impl CheckinConfig {
    /// The dedup window as a [`Duration`].
    pub fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.dedup_window_seconds)
    }
}

fn default_dedup_window() -> u64 {
    5 * 60
}
