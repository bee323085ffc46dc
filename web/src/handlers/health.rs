//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use axum::{Json, http::StatusCode};
use flight_control_runtime::{HealthReport, HealthStatus};
use serde::Serialize;

/// Liveness response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT inspect any component.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {"status":"ok","version":"0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Turn a component report into a readiness response.
///
/// # Status Codes
///
/// - 200 OK: Healthy or Degraded
/// - 503 Service Unavailable: Unhealthy
#[must_use]
pub fn readiness_response(report: HealthReport) -> (StatusCode, Json<HealthReport>) {
    let status = match report.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flight_control_runtime::HealthCheck;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, Json(body)) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert!(!body.version.is_empty());
    }

    #[test]
    fn test_degraded_is_still_ready() {
        let report = HealthReport::new(vec![HealthCheck::degraded("operations", "table is large")]);
        let (status, Json(report)) = readiness_response(report);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_unhealthy_is_not_ready() {
        let report = HealthReport::new(vec![
            HealthCheck::healthy("operations"),
            HealthCheck::unhealthy("passenger_log", "directory is not writable"),
        ]);
        let (status, _) = readiness_response(report);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
