//! Application state for the flight control HTTP server.

use crate::service::FlightControl;
use flight_control_runtime::metrics::MetricsExporter;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Registries, passenger log and export runner
    pub control: Arc<FlightControl>,

    /// Prometheus exporter, `None` when metrics are disabled
    pub metrics: Option<MetricsExporter>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(control: Arc<FlightControl>, metrics: Option<MetricsExporter>) -> Self {
        Self { control, metrics }
    }
}
