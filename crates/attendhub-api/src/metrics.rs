//! Prometheus exposition of the pipeline counters.

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::warn;

use attendhub_core::telemetry::describe_metrics;

/// The recorder is process-global; every `Application` shares one.
static RECORDER: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Renders the process-wide Prometheus recorder.
#[derive(Clone)]
pub struct MetricsHandle(PrometheusHandle);

impl MetricsHandle {
    /// Install the Prometheus recorder on first call and return a handle to it.
    ///
    /// Returns `None` if another recorder already owns the process.
    pub fn install() -> Option<Self> {
        RECORDER
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(handle) => {
                    describe_metrics();
                    Some(handle)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to install Prometheus recorder, /metrics disabled");
                    None
                }
            })
            .clone()
            .map(Self)
    }

    /// Current snapshot in the Prometheus text format.
    pub fn render(&self) -> String {
        self.0.render()
    }
}

impl fmt::Debug for MetricsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MetricsHandle")
    }
}
