//! Prometheus metrics infrastructure

use std::sync::Arc;

use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Prometheus metrics handle for rendering the exposition text
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Get the metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the Prometheus recorder
///
/// Returns `None` if a global recorder is already installed.
pub fn init_metrics() -> Option<PrometheusMetrics> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_default_metrics();
            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    describe_counter!(
        "recall_cache_invocations_total",
        "Calls made through counted operations, by identity"
    );
    describe_counter!(
        "recall_cache_fetch_total",
        "Fetch cache requests, by outcome (hit, miss, error)"
    );
    gauge!("recall_cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}
