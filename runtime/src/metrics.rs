//! Prometheus metrics for observability and monitoring.
//!
//! The runner records:
//! - Operations submitted, completed, failed and evicted
//! - Operations currently pending
//! - Time from submission to terminal state
//!
//! # Example
//!
//! ```rust,no_run
//! use flight_control_runtime::metrics::MetricsExporter;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let exporter = MetricsExporter::install()?;
//!
//! // Serve this from a /metrics endpoint
//! let body = exporter.render();
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus exporter rendered by the HTTP layer.
///
/// Cheap to clone; all clones render the same registry.
#[derive(Clone)]
pub struct MetricsExporter {
    handle: PrometheusHandle,
}

impl std::fmt::Debug for MetricsExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsExporter").finish_non_exhaustive()
    }
}

impl MetricsExporter {
    /// Install the Prometheus recorder as the global metrics recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built, or if a global recorder
    /// is already installed. Call this once per process.
    pub fn install() -> Result<Self, MetricsError> {
        let handle = builder()?
            .install_recorder()
            .map_err(|e| MetricsError::Install(e.to_string()))?;

        describe_metrics();
        tracing::info!("Prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Build a recorder without installing it globally.
    ///
    /// Used with [`metrics::with_local_recorder`] to scope recording to a test.
    ///
    /// # Errors
    ///
    /// Returns error if the histogram buckets are rejected.
    pub fn local() -> Result<(Self, PrometheusRecorder), MetricsError> {
        let recorder = builder()?.build_recorder();
        let exporter = Self {
            handle: recorder.handle(),
        };
        Ok((exporter, recorder))
    }

    /// Render current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Get the underlying Prometheus handle.
    #[must_use]
    pub const fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }
}

fn builder() -> Result<PrometheusBuilder, MetricsError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))
}

/// Register descriptions for the runner's metrics.
pub fn describe_metrics() {
    describe_counter!(
        "operations_submitted_total",
        "Total number of operations submitted to the runner"
    );
    describe_counter!(
        "operations_completed_total",
        "Total number of operations that produced a result"
    );
    describe_counter!(
        "operations_failed_total",
        "Total number of operations that returned an error or panicked"
    );
    describe_counter!(
        "operations_evicted_total",
        "Total number of terminal operations removed after their TTL"
    );
    describe_gauge!("operations_pending", "Operations that have not finished yet");
    describe_histogram!(
        "operation_duration_seconds",
        "Time from submission to terminal state"
    );
}
