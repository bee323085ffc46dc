//! Passenger endpoints.
//!
//! - POST /api/v1/passenger/ - Register a passenger

use crate::server::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use flight_control_core::PassengerId;
use flight_control_web::extractors::check_length;
use flight_control_web::{AppError, Validate, ValidatedJson};
use serde::{Deserialize, Serialize};

/// Longest accepted name or surname
pub const MAX_NAME_LENGTH: usize = 255;

/// Request to register a passenger.
#[derive(Debug, Deserialize)]
pub struct CreatePassengerRequest {
    /// Given name
    pub name: String,
    /// Family name
    pub surname: String,
}

impl Validate for CreatePassengerRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("name", &self.name, 1, MAX_NAME_LENGTH)?;
        check_length("surname", &self.surname, 1, MAX_NAME_LENGTH)
    }
}

/// Response after registering a passenger.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePassengerResponse {
    /// Identity of the new passenger
    pub passenger_id: PassengerId,
}

/// Register a passenger. Also appends a row to the passenger log.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8000/api/v1/passenger/ \
///   -H "Content-Type: application/json" \
///   -d '{"name":"Yuri","surname":"Gagarin"}'
/// # 201 {"passenger_id":0}
/// ```
pub async fn create_passenger(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreatePassengerRequest>,
) -> Result<(StatusCode, Json<CreatePassengerResponse>), AppError> {
    let passenger_id = state
        .control
        .add_passenger(request.name, request.surname)
        .await;

    Ok((StatusCode::CREATED, Json(CreatePassengerResponse { passenger_id })))
}
