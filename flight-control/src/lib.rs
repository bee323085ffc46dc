//! Space Flight Control - flights, passengers and seat bookings over HTTP.
//!
//! The service keeps two in-memory registries and a durable passenger log:
//!
//! - **Flights**: route, capacity, status and the passengers booked on board
//! - **Passengers**: name and surname, appended to the log on registration
//! - **Exports**: rewriting the passenger log runs in the background and is
//!   polled by operation id
//!
//! # Architecture
//!
//! ```text
//! api::* handlers
//!     │
//!     ▼
//! FlightControl ── RwLock<FlightRegistry>
//!     │         └─ RwLock<PassengerRegistry>
//!     │         └─ append ──┐
//!     │                      ▼
//!     └─ submit / poll ──► OperationRunner ──► LogWriter ──► PassengerLog
//! ```
//!
//! Every passenger log write goes through one [`LogWriter`] task, so request
//! handlers never touch the file and appends and exports land in the order
//! they were queued.
//!
//! Booking is the one operation with a cross-registry rule: the passenger must
//! exist, and the flight must have a free seat. The facade checks the first
//! and the flight registry enforces the second under a single write guard.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod metrics;
pub mod passenger_log;
pub mod server;
pub mod service;

pub use config::Config;
pub use passenger_log::{ExportArtifact, LogError, LogWriter, PassengerLog, PendingExport};
pub use server::{AppState, build_router};
pub use service::{FlightControl, ServiceError};
