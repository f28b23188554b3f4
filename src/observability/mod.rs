//! # Observability Infrastructure
//!
//! Structured logging for the lockbox service: subscriber setup with
//! optional JSON output and file rotation, plus log-message sanitization.

pub mod logging;
pub mod sanitize;

pub use logging::{init_logging, log_config_info};
pub use sanitize::sanitize_log_message;

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// Initialize all observability components.
///
/// Returns the file-writer guard when file logging is enabled; the caller
/// holds it until shutdown so buffered log lines are flushed.
pub fn init_observability(config: &ObservabilityConfig) -> Result<Option<WorkerGuard>> {
    let guard = init_logging(config)?;

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = %config.json_logging,
        file_logging = %config.log_file.is_some(),
        "Observability initialized successfully"
    );

    Ok(guard)
}
