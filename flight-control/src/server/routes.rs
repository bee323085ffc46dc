//! Router configuration for the flight control service.

use super::health::{metrics, readiness_check};
use super::state::AppState;
use crate::api::{flights, operations, passengers, tickets};
use axum::{
    Router,
    routing::{get, post},
};
use flight_control_web::correlation_id_layer;
use flight_control_web::handlers::health_check;

/// Build the complete Axum router.
///
/// ```text
/// POST     /api/v1/flight/          create flight
/// POST     /api/v1/flight/status    change status
/// POST     /api/v1/passenger/       register passenger
/// POST|GET /api/v1/ticket/          book seat
/// GET      /api/v1/delayed/         delayed check
/// GET      /api/v1/log/             start export
/// GET      /api/v1/log/status/      poll export
/// GET      /health, /ready, /metrics
/// ```
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Flights
        .route("/flight/", post(flights::create_flight))
        .route("/flight/status", post(flights::change_flight_status))
        .route("/delayed/", get(flights::is_delayed))
        // Passengers
        .route("/passenger/", post(passengers::create_passenger))
        // Tickets
        .route(
            "/ticket/",
            post(tickets::book_ticket).get(tickets::book_ticket),
        )
        // Passenger log exports
        .route("/log/", get(operations::submit_log_export))
        .route("/log/status/", get(operations::log_export_status));

    Router::new()
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .nest("/api/v1", api_routes)
        .layer(correlation_id_layer())
        .with_state(state)
}
