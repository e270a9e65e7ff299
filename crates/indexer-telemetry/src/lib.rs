//! Structured logging, Prometheus metrics, and progress-milestone helpers
//! shared by every consumer process.

mod metrics;
mod milestones;

pub use metrics::{encode, register_metrics, REGISTRY};
pub use milestones::Milestones;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
    #[error("failed to register metrics: {0}")]
    MetricsInit(#[from] prometheus::Error),
}

/// Initializes the global `tracing` subscriber from `RUST_LOG` (default
/// `info`) and registers the pipeline's Prometheus metrics. Call once at
/// process startup, before the consumer runtime loop starts.
pub fn init(service_name: &str) -> Result<(), TelemetryError> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| TelemetryError::TracingInit(e.to_string()))?;

    register_metrics()?;

    tracing::info!(service = service_name, "telemetry initialized");
    Ok(())
}

/// Logs a service lifecycle event with a configuration summary, per the
/// observability contract's "start/stop with configuration summary" hook.
pub fn log_lifecycle_event(service_name: &str, event: &str, summary: &str) {
    tracing::info!(service = service_name, event, summary, "lifecycle event");
}
