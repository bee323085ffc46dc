//! Error types for registry operations.

use thiserror::Error;

/// Errors returned by the flight and passenger registries.
///
/// These are expected, local outcomes. Every variant maps to a stable
/// [`code`](RegistryError::code) that the HTTP layer translates into a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Constructor input was rejected (e.g. non-positive capacity)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Identity outside the range of issued identities
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind ("Flight", "Passenger")
        entity: &'static str,
        /// The identity that was looked up
        id: usize,
    },

    /// Booking against a flight whose passenger list is full
    #[error("Flight {flight_id} is already full ({max_capacity} seats)")]
    CapacityExceeded {
        /// Flight that rejected the booking
        flight_id: usize,
        /// Its maximum capacity
        max_capacity: usize,
    },
}

impl RegistryError {
    /// Stable machine-readable outcome code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
        }
    }
}
