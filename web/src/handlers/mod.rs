//! HTTP request handlers shared by every deployment.

pub mod health;

// Re-export common handler utilities
pub use health::{HealthResponse, health_check, readiness_response};
