//! # Flight Control Core
//!
//! In-memory registries for the space flight control system.
//!
//! This crate provides the synchronous half of the system: append-only entity
//! storage, the flight registry with its capacity and status rules, and the
//! passenger registry used for existence checks during booking.
//!
//! ## Core Concepts
//!
//! - **Registry**: Append-only indexed store, identity = insertion index
//! - **Flight**: Route, capacity, status and the ordered list of booked passengers
//! - **Passenger**: Immutable name/surname pair
//! - **Environment**: Injected dependencies via traits (`Clock`)
//!
//! ## Concurrency
//!
//! Nothing in this crate synchronizes internally. Applications that share a
//! registry between tasks wrap it in a lock, and must hold a single write guard
//! across `FlightRegistry::book_ticket` so the capacity check and the append
//! stay atomic.
//!
//! ## Example
//!
//! ```
//! use flight_control_core::{FlightRegistry, FlightStatus, PassengerRegistry, RegistryError};
//!
//! let mut flights = FlightRegistry::new();
//! let mut passengers = PassengerRegistry::new();
//!
//! let flight = flights.add_flight("Earth", "Mars", 1)?;
//! let elon = passengers.add_passenger("Elon", "Musk");
//! let yuri = passengers.add_passenger("Yuri", "Gagarin");
//!
//! flights.book_ticket(flight, elon)?;
//! assert!(matches!(
//!     flights.book_ticket(flight, yuri),
//!     Err(RegistryError::CapacityExceeded { .. })
//! ));
//!
//! flights.set_status(flight, FlightStatus::Delayed)?;
//! assert!(flights.is_delayed(flight)?);
//! # Ok::<(), RegistryError>(())
//! ```

pub mod error;
pub mod flight;
pub mod passenger;
pub mod registry;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use error::RegistryError;
pub use flight::{Flight, FlightId, FlightRegistry, FlightStatus};
pub use passenger::{Passenger, PassengerId, PassengerRegistry};
pub use registry::{Entity, EntityId, EntityRegistry};

/// Environment module - Dependency injection traits
///
/// All time-dependent behavior (operation timestamps, retention) reads the
/// current time through [`Clock`](environment::Clock) so tests can pin or
/// advance it.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - uses system clock
    /// let clock = SystemClock;
    ///
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock backed by [`Utc::now`].
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
        fn now(&self) -> DateTime<Utc> {
            (**self).now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::environment::{Clock, SystemClock};

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
