//! # Structured Logging
//!
//! Builds the tracing-subscriber stack: an `EnvFilter` derived from
//! configuration (overridable via `RUST_LOG`), a stdout layer in plain or
//! JSON format, and an optional daily-rolling JSON file layer.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{Error, Result};

/// Initialize the global tracing subscriber.
///
/// Returns the worker guard for the async file writer when file logging is
/// configured; the caller must hold it for the lifetime of the process so
/// buffered log lines are flushed on shutdown.
pub fn init_logging(config: &ObservabilityConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let (file_writer, guard) = match &config.log_file {
        Some(path) => {
            let (writer, guard) = create_file_writer(path)?;
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    // Separate branches because each combination produces a different
    // subscriber type.
    match (config.json_logging, file_writer) {
        (false, Some(file_writer)) => {
            let console_layer = fmt::layer()
                .with_writer(io::stdout)
                .with_span_events(FmtSpan::CLOSE);

            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(false)
                .json();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;
        }
        (false, None) => {
            let console_layer = fmt::layer()
                .with_writer(io::stdout)
                .with_span_events(FmtSpan::CLOSE);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init()
                .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;
        }
        (true, Some(file_writer)) => {
            let console_layer = fmt::layer()
                .with_writer(io::stdout)
                .with_span_events(FmtSpan::CLOSE)
                .json();

            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(false)
                .json();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;
        }
        (true, None) => {
            let console_layer = fmt::layer()
                .with_writer(io::stdout)
                .with_span_events(FmtSpan::CLOSE)
                .json();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init()
                .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;
        }
    }

    Ok(guard)
}

/// Build the non-blocking daily-rolling file writer for `path`.
fn create_file_writer(
    path: &str,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let path = Path::new(path);
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "lockbox.log".to_string());

    std::fs::create_dir_all(directory)?;

    let file_appender = tracing_appender::rolling::daily(directory, prefix);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        database_url = %config.database.url,
        log_level = %config.observability.log_level,
        json_logging = %config.observability.json_logging,
        cors_enabled = %config.server.enable_cors,
        "Lockbox service configuration"
    );
}
