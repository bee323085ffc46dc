//! Flights and the capacity-constrained flight registry.
//!
//! A flight's passenger list only grows, in purchase order, and never exceeds
//! its maximum capacity. Status changes are unrestricted: any status can be
//! reached from any other.

use crate::error::RegistryError;
use crate::passenger::PassengerId;
use crate::registry::{Entity, EntityId, EntityRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Identity of a flight (its index in the registry)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightId(usize);

impl FlightId {
    /// Create a `FlightId` from a raw index
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl EntityId for FlightId {
    fn from_index(index: usize) -> Self {
        Self(index)
    }

    fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Flight
// ============================================================================

/// Lifecycle status of a flight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    /// Tickets can be bought
    #[default]
    AvailableForRegistration,
    /// Registration closed
    RegistrationCompleted,
    /// In flight
    OnTheWay,
    /// Landed
    Arrived,
    /// Departure postponed
    Delayed,
}

impl FlightStatus {
    /// All statuses, in declaration order
    pub const ALL: [Self; 5] = [
        Self::AvailableForRegistration,
        Self::RegistrationCompleted,
        Self::OnTheWay,
        Self::Arrived,
        Self::Delayed,
    ];

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AvailableForRegistration => "AVAILABLE_FOR_REGISTRATION",
            Self::RegistrationCompleted => "REGISTRATION_COMPLETED",
            Self::OnTheWay => "ON_THE_WAY",
            Self::Arrived => "ARRIVED",
            Self::Delayed => "DELAYED",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flight between two locations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Flight {
    /// Where the flight departs from
    pub departure_location: String,
    /// Where the flight arrives
    pub arrival_location: String,
    max_capacity: usize,
    /// Current status
    pub status: FlightStatus,
    passengers: Vec<PassengerId>,
}

impl Flight {
    /// Create a flight with an empty passenger list and the default status.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if `max_capacity` is not positive.
    pub fn new(
        departure_location: impl Into<String>,
        arrival_location: impl Into<String>,
        max_capacity: i64,
    ) -> Result<Self, RegistryError> {
        let max_capacity = usize::try_from(max_capacity)
            .ok()
            .filter(|capacity| *capacity > 0)
            .ok_or_else(|| {
                RegistryError::InvalidArgument(format!(
                    "Passenger capacity must be greater than 0, got {max_capacity}"
                ))
            })?;

        Ok(Self {
            departure_location: departure_location.into(),
            arrival_location: arrival_location.into(),
            max_capacity,
            status: FlightStatus::default(),
            passengers: Vec::new(),
        })
    }

    /// Maximum number of passengers
    #[must_use]
    pub const fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Booked passengers in purchase order
    #[must_use]
    pub fn passengers(&self) -> &[PassengerId] {
        &self.passengers
    }

    /// Seats still available
    #[must_use]
    pub fn available_seats(&self) -> usize {
        self.max_capacity - self.passengers.len()
    }

    /// Whether every seat is taken
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.passengers.len() >= self.max_capacity
    }
}

impl Entity for Flight {
    type Id = FlightId;
    const KIND: &'static str = "Flight";
}

// ============================================================================
// Registry
// ============================================================================

/// Registry of flights enforcing capacity and status rules.
#[derive(Debug, Clone, Default)]
pub struct FlightRegistry {
    flights: EntityRegistry<Flight>,
}

impl FlightRegistry {
    /// Create an empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self {
            flights: EntityRegistry::new(),
        }
    }

    /// Register a new flight.
    ///
    /// A rejected flight does not consume an identity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if `max_capacity <= 0`.
    pub fn add_flight(
        &mut self,
        departure_location: impl Into<String>,
        arrival_location: impl Into<String>,
        max_capacity: i64,
    ) -> Result<FlightId, RegistryError> {
        let flight = Flight::new(departure_location, arrival_location, max_capacity)?;
        Ok(self.flights.add(flight))
    }

    /// Look up a flight.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub fn flight(&self, id: FlightId) -> Result<&Flight, RegistryError> {
        self.flights.get(id)
    }

    /// Overwrite the status of a flight.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub fn set_status(&mut self, id: FlightId, status: FlightStatus) -> Result<(), RegistryError> {
        self.flights.get_mut(id)?.status = status;
        Ok(())
    }

    /// Book a seat for `passenger_id`.
    ///
    /// The passenger identity is NOT checked against any passenger registry;
    /// callers confirm it exists first. Booking the same passenger twice takes
    /// two seats.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if the flight does not exist
    /// - [`RegistryError::CapacityExceeded`] if the flight is full; the
    ///   passenger list is left untouched
    pub fn book_ticket(
        &mut self,
        flight_id: FlightId,
        passenger_id: PassengerId,
    ) -> Result<(), RegistryError> {
        let flight = self.flights.get_mut(flight_id)?;

        if flight.is_full() {
            return Err(RegistryError::CapacityExceeded {
                flight_id: flight_id.get(),
                max_capacity: flight.max_capacity,
            });
        }

        flight.passengers.push(passenger_id);
        Ok(())
    }

    /// Whether the flight is currently delayed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub fn is_delayed(&self, id: FlightId) -> Result<bool, RegistryError> {
        Ok(self.flights.get(id)?.status == FlightStatus::Delayed)
    }

    /// Number of registered flights
    #[must_use]
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Whether no flight has been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Iterate over flights in identity order
    pub fn iter(&self) -> impl Iterator<Item = (FlightId, &Flight)> {
        self.flights.iter()
    }
}
