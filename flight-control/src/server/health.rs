//! Health, readiness and metrics endpoints.

use super::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use flight_control_runtime::HealthReport;
use flight_control_web::handlers::readiness_response;

/// Readiness check endpoint.
///
/// Reports the export runner (degraded when too many operations are
/// tracked) and the passenger log directory.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8000/ready
/// # {"status":"Healthy","checks":[...],"timestamp":"..."}
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    readiness_response(state.control.health())
}

/// Prometheus scrape endpoint.
///
/// Returns 404 when metrics are disabled.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(exporter) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            exporter.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
