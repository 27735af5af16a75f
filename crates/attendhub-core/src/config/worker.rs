//! Verification worker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Verification worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Run the worker inside the API server process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Probe the face verifier before consuming. A failed probe only warns.
    #[serde(default = "default_true")]
    pub probe_on_start: bool,
    /// Pause between processed messages, in milliseconds.
    #[serde(default = "default_pause")]
    pub pause_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            probe_on_start: default_true(),
            pause_ms: default_pause(),
        }
    }
}

impl WorkerConfig {
    /// Inter-message pause as a [`Duration`].
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_pause() -> u64 {
    10
}
