//! The flight control facade.
//!
//! `FlightControl` owns both registries, the passenger log and the export
//! runner. It is built once at startup and shared with handlers through
//! `Arc`.
//!
//! # Locking
//!
//! Each registry sits behind its own `tokio::sync::RwLock`. Booking takes the
//! passenger lock (read) and then the flight lock (write), and holds the
//! flight guard across the capacity check and the append. Every path that
//! needs both locks takes them in that order.
//!
//! # Passenger log
//!
//! Log writes are queued to a [`LogWriter`] while the passenger lock is held:
//! registrations queue their row under the write guard, and an export queues
//! its rewrite under a read guard when the export runs. The queue therefore
//! matches registration order, and no request waits for file I/O.

use crate::config::Config;
use crate::passenger_log::{ExportArtifact, LogError, LogWriter, PassengerLog};
use flight_control_core::environment::{Clock, SystemClock};
use flight_control_core::{
    Flight, FlightId, FlightRegistry, FlightStatus, PassengerId, PassengerRegistry, RegistryError,
};
use flight_control_runtime::{
    HealthReport, Operation, OperationError, OperationId, OperationRunner, RunnerConfig,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors returned by [`FlightControl`].
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Registry rule violated (bad argument, unknown flight, full flight)
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Booking referenced a passenger that was never registered
    #[error("Passenger with id {0} not found")]
    PassengerNotFound(PassengerId),

    /// Unknown or unfinished background operation
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// Passenger log could not be written
    #[error(transparent)]
    Log(#[from] LogError),
}

/// Service object holding all flight control state.
pub struct FlightControl<C = SystemClock> {
    flights: RwLock<FlightRegistry>,
    passengers: Arc<RwLock<PassengerRegistry>>,
    log: LogWriter,
    exports: OperationRunner<ExportArtifact, C>,
}

impl FlightControl<SystemClock> {
    /// Build the service from configuration.
    ///
    /// Does not touch the file system; call
    /// [`initialize_log`](Self::initialize_log) at startup.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let runner_config = RunnerConfig::new(
            config.operations.completed_ttl(),
            config.operations.soft_limit,
        );

        Self::new(
            PassengerLog::new(config.log.path()),
            OperationRunner::with_config(SystemClock, runner_config),
        )
    }
}

impl<C: Clock + 'static> FlightControl<C> {
    /// Create a service with empty registries, starting the log writer task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new(log: PassengerLog, exports: OperationRunner<ExportArtifact, C>) -> Self {
        Self::with_log_writer(LogWriter::spawn(log), exports)
    }

    /// Create a service that queues log writes to an existing writer.
    #[must_use]
    pub fn with_log_writer(log: LogWriter, exports: OperationRunner<ExportArtifact, C>) -> Self {
        Self {
            flights: RwLock::new(FlightRegistry::new()),
            passengers: Arc::new(RwLock::new(PassengerRegistry::new())),
            log,
            exports,
        }
    }

    /// Truncate the passenger log and write its header.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Log`] if the file cannot be written.
    pub async fn initialize_log(&self) -> Result<(), ServiceError> {
        Ok(self.log.initialize().await?)
    }

    /// Wait until every queued log write has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Log`] if the writer task has stopped.
    pub async fn flush_log(&self) -> Result<(), ServiceError> {
        Ok(self.log.flush().await?)
    }

    // ========================================================================
    // Flights
    // ========================================================================

    /// Register a flight.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if `max_capacity <= 0`.
    #[tracing::instrument(skip(self, departure_location, arrival_location))]
    pub async fn add_flight(
        &self,
        departure_location: String,
        arrival_location: String,
        max_capacity: i64,
    ) -> Result<FlightId, ServiceError> {
        let flight_id =
            self.flights
                .write()
                .await
                .add_flight(departure_location, arrival_location, max_capacity)?;

        metrics::counter!("flights_created_total").increment(1);
        tracing::info!(%flight_id, "Flight created");
        Ok(flight_id)
    }

    /// Copy of a flight's current state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub async fn flight(&self, flight_id: FlightId) -> Result<Flight, ServiceError> {
        Ok(self.flights.read().await.flight(flight_id)?.clone())
    }

    /// Overwrite a flight's status.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    #[tracing::instrument(skip(self))]
    pub async fn set_flight_status(
        &self,
        flight_id: FlightId,
        status: FlightStatus,
    ) -> Result<(), ServiceError> {
        self.flights.write().await.set_status(flight_id, status)?;
        tracing::info!(%flight_id, %status, "Flight status updated");
        Ok(())
    }

    /// Whether a flight is delayed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub async fn is_delayed(&self, flight_id: FlightId) -> Result<bool, ServiceError> {
        Ok(self.flights.read().await.is_delayed(flight_id)?)
    }

    // ========================================================================
    // Passengers
    // ========================================================================

    /// Register a passenger and queue their row for the passenger log.
    ///
    /// The write happens in the background. A failed append is logged and
    /// counted but does not fail the registration.
    #[tracing::instrument(skip(self, name, surname))]
    pub async fn add_passenger(&self, name: String, surname: String) -> PassengerId {
        let mut passengers = self.passengers.write().await;
        let passenger_id = passengers.add_passenger(name, surname);

        // Queued under the write guard so the log keeps registration order
        if let Ok(passenger) = passengers.get_passenger(passenger_id) {
            self.log.append(passenger.clone());
        }
        drop(passengers);

        metrics::counter!("passengers_registered_total").increment(1);
        tracing::info!(%passenger_id, "Passenger registered");
        passenger_id
    }

    // ========================================================================
    // Booking
    // ========================================================================

    /// Book a seat on a flight for a registered passenger.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::PassengerNotFound`] if the passenger is unknown
    /// - [`RegistryError::NotFound`] if the flight is unknown
    /// - [`RegistryError::CapacityExceeded`] if the flight is full
    #[tracing::instrument(skip(self))]
    pub async fn book_ticket(
        &self,
        flight_id: FlightId,
        passenger_id: PassengerId,
    ) -> Result<(), ServiceError> {
        let passengers = self.passengers.read().await;
        if passengers.get_passenger(passenger_id).is_err() {
            metrics::counter!("tickets_rejected_total", "reason" => "passenger_not_found").increment(1);
            return Err(ServiceError::PassengerNotFound(passenger_id));
        }

        let result = self.flights.write().await.book_ticket(flight_id, passenger_id);
        drop(passengers);

        match result {
            Ok(()) => {
                metrics::counter!("tickets_booked_total").increment(1);
                tracing::info!(%flight_id, %passenger_id, "Ticket booked");
                Ok(())
            },
            Err(error) => {
                let reason = match error {
                    RegistryError::CapacityExceeded { .. } => "capacity_exceeded",
                    RegistryError::NotFound { .. } => "flight_not_found",
                    RegistryError::InvalidArgument(_) => "invalid_argument",
                };
                metrics::counter!("tickets_rejected_total", "reason" => reason).increment(1);
                tracing::info!(%flight_id, %passenger_id, reason, "Ticket rejected");
                Err(error.into())
            },
        }
    }

    // ========================================================================
    // Exports
    // ========================================================================

    /// Start a passenger log export in the background.
    ///
    /// The export writes every passenger registered by the time it runs.
    /// Passengers registered afterwards are appended after the rewrite.
    #[tracing::instrument(skip(self))]
    pub fn submit_log_export(&self) -> OperationId {
        let passengers = Arc::clone(&self.passengers);
        let log = self.log.clone();

        let operation_id = self.exports.submit_async(async move {
            let pending = {
                let registry = passengers.read().await;
                log.export(registry.snapshot())
            };
            pending.finish().await
        });
        tracing::info!(%operation_id, "Passenger log export submitted");
        operation_id
    }

    /// Current state of a background operation.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::NotFound`] for an unknown or evicted handle.
    pub fn poll_operation(
        &self,
        operation_id: OperationId,
    ) -> Result<Operation<ExportArtifact>, ServiceError> {
        Ok(self.exports.poll(operation_id)?)
    }

    /// Wait for a background operation to finish.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::NotFound`] for an unknown handle and
    /// [`OperationError::Timeout`] if it does not finish in time.
    pub async fn wait_operation(
        &self,
        operation_id: OperationId,
        timeout: Duration,
    ) -> Result<Operation<ExportArtifact>, ServiceError> {
        Ok(self.exports.wait(operation_id, timeout).await?)
    }

    /// The export runner, for sweeping and diagnostics
    #[must_use]
    pub const fn exports(&self) -> &OperationRunner<ExportArtifact, C> {
        &self.exports
    }

    /// Health of the runner and the passenger log
    #[must_use]
    pub fn health(&self) -> HealthReport {
        HealthReport::new(vec![self.exports.health(), self.log.health()])
    }
}
