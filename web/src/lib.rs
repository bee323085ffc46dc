//! Axum integration for Space Flight Control.
//!
//! This crate holds the HTTP plumbing shared by the application: the error
//! type that turns domain failures into JSON responses, extractors that
//! validate request bodies and query strings, and request-tracking middleware.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract and validate** the body or query (`ValidatedJson`, `ValidatedQuery`)
//! 3. **Call** the flight control facade
//! 4. **Map** the domain result or error (`AppError`) to an HTTP response
//!
//! # Example
//!
//! ```ignore
//! use flight_control_web::{AppError, ValidatedJson};
//! use axum::{Router, routing::post, Json};
//!
//! async fn create_passenger(
//!     State(state): State<AppState>,
//!     ValidatedJson(request): ValidatedJson<CreatePassengerRequest>,
//! ) -> Result<(StatusCode, Json<CreatePassengerResponse>), AppError> {
//!     let passenger_id = state.control.add_passenger(request.name, request.surname).await;
//!     Ok((StatusCode::CREATED, Json(CreatePassengerResponse { passenger_id })))
//! }
//!
//! let app = Router::new()
//!     .route("/api/v1/passenger/", post(create_passenger))
//!     .with_state(app_state);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{CorrelationId, Validate, ValidatedJson, ValidatedQuery};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};
