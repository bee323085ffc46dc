//! Ticket endpoints.
//!
//! - POST or GET /api/v1/ticket/ - Book a seat

use crate::server::state::AppState;
use axum::{extract::State, http::StatusCode};
use flight_control_core::{FlightId, PassengerId};
use flight_control_web::{AppError, Validate, ValidatedQuery};
use serde::Deserialize;

/// Query naming the flight and the passenger to seat.
#[derive(Debug, Deserialize)]
pub struct BookTicketQuery {
    /// Flight to book
    pub flight_id: FlightId,
    /// Passenger taking the seat
    pub passenger_id: PassengerId,
}

impl Validate for BookTicketQuery {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Book a seat.
///
/// - 200: seat booked
/// - 403: flight is full
/// - 404: unknown passenger or flight
/// - 422: missing or invalid ids
///
/// # Example
///
/// ```bash
/// curl -X POST "http://localhost:8000/api/v1/ticket/?flight_id=0&passenger_id=0"
/// ```
pub async fn book_ticket(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<BookTicketQuery>,
) -> Result<StatusCode, AppError> {
    state
        .control
        .book_ticket(query.flight_id, query.passenger_id)
        .await?;

    Ok(StatusCode::OK)
}
