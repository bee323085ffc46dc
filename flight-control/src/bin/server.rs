//! Space Flight Control Server
//!
//! This binary:
//! - Loads configuration from the environment (and `.env`)
//! - Initializes the passenger log and its writer task
//! - Installs the Prometheus recorder
//! - Starts the operation sweeper
//! - Serves the HTTP API until Ctrl+C
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use flight_control::{AppState, Config, FlightControl, build_router};
use flight_control_runtime::metrics::MetricsExporter;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env();

    // Initialize tracing from the configured filter
    let filter = EnvFilter::try_new(&config.server.log_level).unwrap_or_else(|_| {
        EnvFilter::new(flight_control::config::DEFAULT_LOG_LEVEL)
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Space Flight Control server...");
    tracing::info!(
        address = %config.bind_address(),
        log_level = %config.server.log_level,
        passenger_log = %config.log.path().display(),
        operation_ttl_secs = config.operations.ttl_secs,
        metrics = config.metrics.enabled,
        "Configuration loaded"
    );

    let metrics = if config.metrics.enabled {
        let exporter = MetricsExporter::install().context("failed to install metrics recorder")?;
        flight_control::metrics::register_business_metrics();
        Some(exporter)
    } else {
        None
    };

    let control = Arc::new(FlightControl::from_config(&config));
    control
        .initialize_log()
        .await
        .context("failed to initialize passenger log")?;

    let sweeper = control
        .exports()
        .spawn_sweeper(config.operations.sweep_interval());

    let app = build_router(AppState::new(Arc::clone(&control), metrics));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    tracing::info!(address = %config.bind_address(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Let running exports finish writing before exiting
    let deadline = Duration::from_secs(config.server.shutdown_timeout);
    let drained = tokio::time::timeout(deadline, async {
        while control.exports().pending_count() > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    if drained.is_err() {
        tracing::warn!(
            pending = control.exports().pending_count(),
            "Shutdown timeout reached with exports still running"
        );
    }

    if let Err(error) = control.flush_log().await {
        tracing::error!(%error, "Passenger log writer stopped before shutdown");
    }

    sweeper.abort();
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully...");
}
