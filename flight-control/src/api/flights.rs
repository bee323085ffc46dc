//! Flight endpoints.
//!
//! - POST /api/v1/flight/ - Create a flight
//! - POST /api/v1/flight/status - Change a flight's status
//! - GET /api/v1/delayed/ - Check whether a flight is delayed

use crate::server::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use flight_control_core::{FlightId, FlightStatus};
use flight_control_web::extractors::check_length;
use flight_control_web::{AppError, Validate, ValidatedJson, ValidatedQuery};
use serde::{Deserialize, Serialize};

/// Longest accepted location name
pub const MAX_LOCATION_LENGTH: usize = 50;

/// Seats assigned when the request does not say
pub const DEFAULT_MAX_CAPACITY: i64 = 50;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a flight.
#[derive(Debug, Deserialize)]
pub struct CreateFlightRequest {
    /// Departure location
    pub departure_location: String,
    /// Arrival location
    pub arrival_location: String,
    /// Seat count (default: 50)
    #[serde(default = "default_max_capacity")]
    pub max_capacity: i64,
}

const fn default_max_capacity() -> i64 {
    DEFAULT_MAX_CAPACITY
}

impl Validate for CreateFlightRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("departure_location", &self.departure_location, 1, MAX_LOCATION_LENGTH)?;
        check_length("arrival_location", &self.arrival_location, 1, MAX_LOCATION_LENGTH)?;
        if self.max_capacity < 1 {
            return Err("max_capacity must be greater than or equal to 1".to_string());
        }
        Ok(())
    }
}

/// Response after creating a flight.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFlightResponse {
    /// Identity of the new flight
    pub flight_id: FlightId,
}

/// Request to change a flight's status.
#[derive(Debug, Deserialize)]
pub struct ChangeFlightStatusRequest {
    /// Flight to update
    pub flight_id: FlightId,
    /// New status
    pub status: FlightStatus,
}

impl Validate for ChangeFlightStatusRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Query naming a single flight.
#[derive(Debug, Deserialize)]
pub struct FlightIdQuery {
    /// Flight to inspect
    pub flight_id: FlightId,
}

impl Validate for FlightIdQuery {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a flight.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8000/api/v1/flight/ \
///   -H "Content-Type: application/json" \
///   -d '{"departure_location":"Earth","arrival_location":"Mars","max_capacity":20}'
/// # 201 {"flight_id":0}
/// ```
pub async fn create_flight(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateFlightRequest>,
) -> Result<(StatusCode, Json<CreateFlightResponse>), AppError> {
    let flight_id = state
        .control
        .add_flight(
            request.departure_location,
            request.arrival_location,
            request.max_capacity,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CreateFlightResponse { flight_id })))
}

/// Change a flight's status.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8000/api/v1/flight/status \
///   -H "Content-Type: application/json" \
///   -d '{"flight_id":0,"status":"DELAYED"}'
/// ```
pub async fn change_flight_status(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ChangeFlightStatusRequest>,
) -> Result<StatusCode, AppError> {
    state
        .control
        .set_flight_status(request.flight_id, request.status)
        .await?;

    Ok(StatusCode::OK)
}

/// 200 if the flight is delayed, 204 otherwise.
///
/// # Example
///
/// ```bash
/// curl -i "http://localhost:8000/api/v1/delayed/?flight_id=0"
/// ```
pub async fn is_delayed(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<FlightIdQuery>,
) -> Result<StatusCode, AppError> {
    if state.control.is_delayed(query.flight_id).await? {
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}
