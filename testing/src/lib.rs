//! # Flight Control Testing
//!
//! Testing utilities and helpers for Space Flight Control.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (`FixedClock`, `ManualClock`)
//! - Builders for pre-populated registries
//! - Property-based testing strategies for domain inputs
//!
//! ## Example
//!
//! ```
//! use flight_control_testing::helpers::RegistryFixture;
//!
//! let fixture = RegistryFixture::new()
//!     .with_flight("Earth", "Mars", 1)
//!     .with_passenger("Elon", "Musk");
//!
//! let (flights, passengers) = fixture.build();
//! assert_eq!(flights.len(), 1);
//! assert_eq!(passengers.len(), 1);
//! ```

use chrono::{DateTime, Utc};
use flight_control_core::environment::Clock;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use flight_control_testing::mocks::FixedClock;
    /// use flight_control_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to.
    ///
    /// Clones share the same time, so a test can keep one clone and hand the
    /// other to the code under test.
    ///
    /// # Example
    ///
    /// ```
    /// use flight_control_testing::{mocks::ManualClock, test_clock};
    /// use flight_control_core::environment::Clock;
    /// use std::time::Duration;
    ///
    /// let clock = ManualClock::new(test_clock().now());
    /// let start = clock.now();
    /// clock.advance(Duration::from_secs(90));
    /// assert_eq!((clock.now() - start).num_seconds(), 90);
    /// ```
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a clock starting at `time`
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward
        ///
        /// # Panics
        ///
        /// Panics if `by` does not fit in a `chrono::Duration`.
        #[allow(clippy::expect_used)]
        pub fn advance(&self, by: Duration) {
            let by = chrono::Duration::from_std(by).expect("advance duration out of range");
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Jump to an absolute time
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = to;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use flight_control_core::{FlightRegistry, PassengerRegistry};

    /// Builder for registries populated in a known order.
    ///
    /// Flights and passengers get identities `0..n` in the order they were
    /// added to the fixture.
    #[derive(Debug, Clone, Default)]
    pub struct RegistryFixture {
        flights: Vec<(String, String, i64)>,
        passengers: Vec<(String, String)>,
    }

    impl RegistryFixture {
        /// Start an empty fixture
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a flight
        #[must_use]
        pub fn with_flight(
            mut self,
            departure: impl Into<String>,
            arrival: impl Into<String>,
            max_capacity: i64,
        ) -> Self {
            self.flights
                .push((departure.into(), arrival.into(), max_capacity));
            self
        }

        /// Add a passenger
        #[must_use]
        pub fn with_passenger(mut self, name: impl Into<String>, surname: impl Into<String>) -> Self {
            self.passengers.push((name.into(), surname.into()));
            self
        }

        /// Add `count` passengers named `Passenger{i} Test`
        #[must_use]
        pub fn with_passengers(mut self, count: usize) -> Self {
            let start = self.passengers.len();
            self.passengers.extend(
                (start..start + count).map(|i| (format!("Passenger{i}"), "Test".to_string())),
            );
            self
        }

        /// Build the registries
        ///
        /// # Panics
        ///
        /// Panics if a fixture flight has a non-positive capacity.
        #[must_use]
        #[allow(clippy::expect_used)]
        pub fn build(self) -> (FlightRegistry, PassengerRegistry) {
            let mut flights = FlightRegistry::new();
            for (departure, arrival, max_capacity) in self.flights {
                flights
                    .add_flight(departure, arrival, max_capacity)
                    .expect("fixture flights must have a positive capacity");
            }

            let mut passengers = PassengerRegistry::new();
            for (name, surname) in self.passengers {
                passengers.add_passenger(name, surname);
            }

            (flights, passengers)
        }
    }

    /// Install a `tracing` subscriber that writes through the test harness.
    ///
    /// Safe to call from every test; only the first call installs.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Locations accepted by the HTTP layer (1 to 50 characters)
    pub fn location() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{0,12}( [A-Z][a-z]{0,12}){0,2}"
    }

    /// Passenger names accepted by the HTTP layer
    pub fn person_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{1,20}"
    }

    /// Positive seat counts
    pub fn capacity() -> impl Strategy<Value = i64> {
        1_i64..=500
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use helpers::RegistryFixture;
    use std::time::Duration;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(test_clock().now());
        let observer = clock.clone();

        clock.advance(Duration::from_secs(3600));
        assert_eq!(observer.now() - test_clock().now(), chrono::Duration::hours(1));

        observer.set(test_clock().now());
        assert_eq!(clock.now(), test_clock().now());
    }

    #[test]
    fn test_fixture_assigns_ids_in_order() {
        let (flights, passengers) = RegistryFixture::new()
            .with_flight("Earth", "Mars", 2)
            .with_flight("Mars", "Titan", 1)
            .with_passenger("Yuri", "Gagarin")
            .with_passengers(2)
            .build();

        assert_eq!(flights.len(), 2);
        let names: Vec<String> = passengers
            .passengers()
            .map(|(_, p)| p.name.clone())
            .collect();
        assert_eq!(names, ["Yuri", "Passenger1", "Passenger2"]);
    }
}
