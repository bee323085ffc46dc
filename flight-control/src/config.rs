//! Configuration management for the flight control service.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Tracing filter used when `RUST_LOG` is unset or does not parse
pub const DEFAULT_LOG_LEVEL: &str = "info,flight_control=debug";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Passenger log file location
    pub log: LogConfig,
    /// Background operation retention
    pub operations: OperationsConfig,
    /// Prometheus metrics
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Tracing filter directives, e.g. `info` or `info,flight_control=debug`
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Passenger log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory holding the log file
    pub dir: PathBuf,
    /// File name of the log
    pub file_name: String,
}

impl LogConfig {
    /// Full path of the log file
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Background operation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationsConfig {
    /// Seconds a finished operation stays pollable (0 = forever)
    pub ttl_secs: u64,
    /// Seconds between retention sweeps
    pub sweep_interval_secs: u64,
    /// Tracked operations above which readiness reports degraded
    pub soft_limit: usize,
}

impl OperationsConfig {
    /// Retention period, `None` when eviction is disabled
    #[must_use]
    pub const fn completed_ttl(&self) -> Option<Duration> {
        if self.ttl_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.ttl_secs))
        }
    }

    /// Sweep interval, never shorter than one second
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and serve `/metrics`
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                log_level: DEFAULT_LOG_LEVEL.to_string(),
                shutdown_timeout: 30,
            },
            log: LogConfig {
                dir: PathBuf::from("static/log"),
                file_name: "passengers.csv".to_string(),
            },
            operations: OperationsConfig {
                ttl_secs: 3600,
                sweep_interval_secs: 60,
                soft_limit: 10_000,
            },
            metrics: MetricsConfig { enabled: true },
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or(defaults.server.host),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.server.port),
                log_level: env::var("RUST_LOG").unwrap_or(defaults.server.log_level),
                shutdown_timeout: env::var("SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.server.shutdown_timeout),
            },
            log: LogConfig {
                dir: env::var("PASSENGER_LOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.log.dir),
                file_name: env::var("PASSENGER_LOG_FILE").unwrap_or(defaults.log.file_name),
            },
            operations: OperationsConfig {
                ttl_secs: env::var("OPERATION_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.operations.ttl_secs),
                sweep_interval_secs: env::var("OPERATION_SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.operations.sweep_interval_secs),
                soft_limit: env::var("OPERATION_SOFT_LIMIT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.operations.soft_limit),
            },
            metrics: MetricsConfig {
                enabled: env::var("METRICS_ENABLED")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.metrics.enabled),
            },
        }
    }

    /// Socket address string for the HTTP listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment_layout() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.log.path(), PathBuf::from("static/log/passengers.csv"));
        assert_eq!(
            config.operations.completed_ttl(),
            Some(Duration::from_secs(3600))
        );
        assert!(config.metrics.enabled);
        assert_eq!(config.server.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_default_log_level_is_a_valid_filter() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_LEVEL).is_ok());
        assert!(tracing_subscriber::EnvFilter::try_new("info,flight_control=loud").is_err());
    }

    #[test]
    fn test_zero_ttl_disables_eviction() {
        let operations = OperationsConfig {
            ttl_secs: 0,
            sweep_interval_secs: 0,
            soft_limit: 1,
        };
        assert_eq!(operations.completed_ttl(), None);
        assert_eq!(operations.sweep_interval(), Duration::from_secs(1));
    }
}
