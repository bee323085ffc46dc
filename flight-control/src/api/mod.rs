//! HTTP API endpoints.
//!
//! Every handler validates its input with the web crate's extractors, calls
//! the [`FlightControl`](crate::FlightControl) facade, and maps domain errors
//! through [`AppError`](flight_control_web::AppError).

pub mod flights;
pub mod operations;
pub mod passengers;
pub mod tickets;

use crate::service::ServiceError;
use flight_control_web::AppError;

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Registry(err) => err.into(),
            ServiceError::PassengerNotFound(id) => Self::not_found("Passenger", id),
            ServiceError::Operation(err) => err.into(),
            ServiceError::Log(err) => {
                Self::internal("Passenger log could not be written").with_source(err.into())
            },
        }
    }
}
