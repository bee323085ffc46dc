//! Custom Axum extractors.
//!
//! - `CorrelationId`: Extract or generate request correlation IDs
//! - `ValidatedJson`: JSON body that is deserialized and then validated
//! - `ValidatedQuery`: Query string that is deserialized and then validated
//!
//! Both validating extractors reject with `422 VALIDATION_ERROR`, whether the
//! input is malformed or merely out of range.
//!
//! # Examples
//!
//! ```ignore
//! use flight_control_web::extractors::{CorrelationId, ValidatedQuery};
//!
//! async fn handler(
//!     correlation_id: CorrelationId,
//!     ValidatedQuery(query): ValidatedQuery<DelayedQuery>,
//! ) -> Result<StatusCode, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, flight_id = query.flight_id, "Checking delay");
//!     Ok(StatusCode::OK)
//! }
//! ```

use crate::error::AppError;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Field-level checks run after deserialization.
///
/// Return a message naming the offending field.
pub trait Validate {
    /// Check the value
    ///
    /// # Errors
    ///
    /// Returns a user-facing description of the first invalid field.
    fn validate(&self) -> Result<(), String>;
}

/// Check that `value` has between `min` and `max` characters.
///
/// # Errors
///
/// Returns a message naming `field` when the length is out of range.
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let length = value.chars().count();
    if length < min {
        if min == 1 {
            return Err(format!("{field} may not be blank"));
        }
        return Err(format!("{field} must have at least {min} characters"));
    }
    if length > max {
        return Err(format!("{field} must have no more than {max} characters"));
    }
    Ok(())
}

/// Correlation ID for request tracing.
///
/// Extracts the correlation ID from the `X-Correlation-ID` header,
/// or generates a new UUID v4 if not present.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Prefer the id stored by the middleware so handler logs match the span
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(crate::middleware::CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// JSON request body, deserialized then validated.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        value.validate().map_err(AppError::validation)?;
        Ok(Self(value))
    }
}

/// Query string parameters, deserialized then validated.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        value.validate().map_err(AppError::validation)?;
        Ok(Self(value))
    }
}
