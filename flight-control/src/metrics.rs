//! Business metrics for the flight control service.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `flights_created_total` - Flights added to the registry
//! - `passengers_registered_total` - Passengers added to the registry
//! - `tickets_booked_total` - Successful bookings
//! - `tickets_rejected_total{reason}` - Failed bookings by reason
//!   (`flight_not_found`, `passenger_not_found`, `capacity_exceeded`)
//! - `passenger_log_write_failures_total` - Row appends that could not be written
//!
//! Operation metrics are described by `flight_control_runtime::metrics`.

use metrics::describe_counter;

/// Register all business metric descriptions.
///
/// Call once at startup, after the recorder is installed.
pub fn register_business_metrics() {
    describe_counter!("flights_created_total", "Total number of flights created");
    describe_counter!(
        "passengers_registered_total",
        "Total number of passengers registered"
    );
    describe_counter!("tickets_booked_total", "Total number of tickets booked");
    describe_counter!(
        "tickets_rejected_total",
        "Total number of rejected bookings by reason"
    );
    describe_counter!(
        "passenger_log_write_failures_total",
        "Total number of passenger rows that could not be appended to the log"
    );

    tracing::info!("Business metrics registered");
}
