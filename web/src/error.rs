//! Error types for web handlers.
//!
//! `AppError` bridges domain errors and HTTP responses by implementing
//! Axum's `IntoResponse`. The mapping from domain errors is fixed:
//!
//! | Domain error | Status | Code |
//! |---|---|---|
//! | `RegistryError::InvalidArgument` | 422 | `VALIDATION_ERROR` |
//! | `RegistryError::NotFound`, `OperationError::NotFound` | 404 | `NOT_FOUND` |
//! | `RegistryError::CapacityExceeded` | 403 | `FORBIDDEN` |
//! | `OperationError::Timeout` | 408 | `TIMEOUT` |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use flight_control_core::RegistryError;
use flight_control_runtime::OperationError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Carries the HTTP status, a user-facing message, a stable error code, and
/// optionally an internal source error that is logged but never sent.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let flight = registry.flight(id)?; // RegistryError converts automatically
///     Ok(Json(flight.into()))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// HTTP status of this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code sent to clients
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// User-facing message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 408 Request Timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::REQUEST_TIMEOUT,
            message.into(),
            "TIMEOUT".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        } else {
            tracing::debug!(status = %self.status, code = %self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidArgument(message) => Self::validation(message),
            RegistryError::NotFound { entity, id } => Self::not_found(entity, id),
            RegistryError::CapacityExceeded { .. } => Self::forbidden(err.to_string()),
        }
    }
}

impl From<OperationError> for AppError {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::NotFound(id) => Self::not_found("Operation", id),
            OperationError::Timeout(_) => Self::timeout(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flight_control_runtime::OperationId;

    #[test]
    fn test_error_display() {
        let err = AppError::validation("Invalid input");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] Invalid input");
    }

    #[test]
    fn test_not_found() {
        let err = AppError::not_found("Flight", 7);
        assert_eq!(err.to_string(), "[NOT_FOUND] Flight with id 7 not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_registry_errors_map_to_stable_statuses() {
        let invalid: AppError = RegistryError::InvalidArgument("max_capacity must be >= 1".into()).into();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(invalid.code(), "VALIDATION_ERROR");

        let missing: AppError = RegistryError::NotFound {
            entity: "Passenger",
            id: 3,
        }
        .into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.message(), "Passenger with id 3 not found");

        let full: AppError = RegistryError::CapacityExceeded {
            flight_id: 0,
            max_capacity: 1,
        }
        .into();
        assert_eq!(full.status(), StatusCode::FORBIDDEN);
        assert_eq!(full.code(), "FORBIDDEN");
    }

    #[test]
    fn test_operation_not_found() {
        let id = OperationId::new();
        let err: AppError = OperationError::NotFound(id).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), format!("Operation with id {id} not found"));
    }

    #[test]
    fn test_anyhow_becomes_internal() {
        let err: AppError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "An internal error occurred");
        assert!(std::error::Error::source(&err).is_some());
    }
}
