//! # Flight Control Runtime
//!
//! Background execution of units of work, with results read back by polling an
//! opaque handle.
//!
//! ## Core Components
//!
//! - **`OperationRunner`**: Schedules work off the caller's stack and tracks it
//! - **`Operation`**: Snapshot of one tracked unit of work (pending, complete or failed)
//! - **Retention**: Terminal operations are evicted after a configurable TTL
//! - **Health / Metrics**: Diagnostics for readiness probes and Prometheus
//!
//! ## Example
//!
//! ```no_run
//! use flight_control_core::environment::SystemClock;
//! use flight_control_runtime::OperationRunner;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), flight_control_runtime::OperationError> {
//! let runner: OperationRunner<u64> = OperationRunner::new(SystemClock);
//!
//! let id = runner.submit(|| Ok::<_, std::io::Error>(42));
//!
//! // The handle is visible immediately, even before the work starts
//! assert!(runner.poll(id).is_ok());
//!
//! let operation = runner.wait(id, Duration::from_secs(5)).await?;
//! assert_eq!(operation.result(), Some(&42));
//! # Ok(())
//! # }
//! ```

use serde::Serialize;

/// Operation runner and its snapshot types
pub mod operation;

/// Prometheus metrics for observability
pub mod metrics;

pub use error::OperationError;
pub use operation::{Operation, OperationId, OperationRunner, OperationStatus, RunnerConfig};

/// Error types for the operation runner
pub mod error {
    use crate::operation::OperationId;
    use thiserror::Error;

    /// Errors returned when looking up operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum OperationError {
        /// The handle was never issued, or its operation was evicted
        #[error("Operation {0} not found")]
        NotFound(OperationId),

        /// The operation did not finish within the allotted time
        ///
        /// Returned by `OperationRunner::wait`; the operation keeps running.
        #[error("Timeout waiting for operation {0}")]
        Timeout(OperationId),
    }
}

/// Health check status levels
///
/// Indicates the current health state of a component or system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthStatus {
    /// Component is fully operational
    Healthy,

    /// Component is operational but experiencing issues (e.g., a large operation table)
    Degraded,

    /// Component is not operational
    Unhealthy,
}

impl HealthStatus {
    /// Check if status is healthy
    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Check if status is unhealthy
    #[must_use]
    pub const fn is_unhealthy(self) -> bool {
        matches!(self, Self::Unhealthy)
    }

    /// Get the worst status between two statuses
    #[must_use]
    pub const fn worst(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unhealthy, _) | (_, Self::Unhealthy) => Self::Unhealthy,
            (Self::Degraded, _) | (_, Self::Degraded) => Self::Degraded,
            _ => Self::Healthy,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check result for a component
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    /// Name of the component being checked
    pub component: String,

    /// Current health status
    pub status: HealthStatus,

    /// Optional message providing details
    pub message: Option<String>,

    /// Optional metadata (e.g., table sizes)
    pub metadata: Vec<(String, String)>,
}

impl HealthCheck {
    /// Create a healthy check result
    #[must_use]
    pub fn healthy(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            message: None,
            metadata: Vec::new(),
        }
    }

    /// Create a degraded check result
    #[must_use]
    pub fn degraded(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Degraded,
            message: Some(message.into()),
            metadata: Vec::new(),
        }
    }

    /// Create an unhealthy check result
    #[must_use]
    pub fn unhealthy(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            metadata: Vec::new(),
        }
    }

    /// Add metadata to the health check
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }
}

/// Aggregated health report
///
/// Combines multiple health checks into an overall system status.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Overall system status (worst of all checks)
    pub status: HealthStatus,

    /// Individual component checks
    pub checks: Vec<HealthCheck>,

    /// Timestamp when report was generated
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    /// Create a new health report from checks
    #[must_use]
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        let status = checks
            .iter()
            .map(|c| c.status)
            .fold(HealthStatus::Healthy, HealthStatus::worst);

        Self {
            status,
            checks,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Check if overall system is healthy
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// Check if overall system is unhealthy
    #[must_use]
    pub const fn is_unhealthy(&self) -> bool {
        self.status.is_unhealthy()
    }
}
