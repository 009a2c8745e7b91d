//! Logging setup with a reloadable filter.
//!
//! This module provides:
//! - Runtime log level changes via `tracing_subscriber::reload`
//! - Console output with local timezone timestamps
//! - Optional daily-rolling log files

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    reload::{self, Handle},
    util::SubscriberInitExt,
};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "notification_service=info,tower_http=info,rdkafka=warn";

/// Log file name prefix inside the log directory.
const LOG_FILE_PREFIX: &str = "notification-service.log";

/// Formats timestamps in the server's local timezone.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Type alias for the reload handle.
pub type FilterHandle = Handle<EnvFilter, tracing_subscriber::Registry>;

/// Handle on the live logging configuration.
pub struct LoggingConfig {
    handle: FilterHandle,
}

impl LoggingConfig {
    pub fn new(handle: FilterHandle) -> Self {
        Self { handle }
    }

    /// Get the current filter directive string.
    pub fn get_filter(&self) -> String {
        self.handle
            .with_current(|filter| filter.to_string())
            .unwrap_or_default()
    }

    /// Replace the filter directive, e.g. `notification_service=debug`.
    pub fn set_filter(&self, directive: &str) -> crate::Result<()> {
        let new_filter = EnvFilter::try_new(directive)
            .map_err(|e| crate::Error::config(format!("Invalid filter directive: {}", e)))?;

        self.handle
            .reload(new_filter)
            .map_err(|e| crate::Error::Other(format!("Failed to reload filter: {}", e)))?;

        info!(directive = %directive, "Log filter updated");
        Ok(())
    }
}

/// Initialize the global subscriber.
///
/// When `log_dir` is set, logs are also written to a daily-rolling file
/// there; keep the returned guard alive for the lifetime of the process.
pub fn init_logging(
    log_dir: Option<&Path>,
) -> crate::Result<(Arc<LoggingConfig>, Option<WorkerGuard>)> {
    let initial_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let (filter_layer, filter_handle) = reload::Layer::new(initial_filter);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_timer(LocalTimer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_ansi(true).with_timer(LocalTimer))
        .with(file_layer)
        .try_init()
        .map_err(|e| {
            crate::Error::Other(format!("Failed to set global default subscriber: {}", e))
        })?;

    Ok((Arc::new(LoggingConfig::new(filter_handle)), guard))
}

/// Log targets worth tuning, for API responses.
pub fn available_modules() -> Vec<(&'static str, &'static str)> {
    vec![
        ("notification_service", "Main application"),
        (
            "notification_service::consumer",
            "Event stream consumer",
        ),
        (
            "notification_service::notification",
            "Normalization, store and fan-out",
        ),
        ("rdkafka", "Kafka client"),
        ("tower_http", "HTTP middleware"),
    ]
}

/// Build a config around a detached reload layer, for tests.
#[cfg(test)]
pub(crate) fn detached(directive: &str) -> (Arc<LoggingConfig>, impl Layer<tracing_subscriber::Registry>) {
    let (layer, handle) = reload::Layer::new(EnvFilter::new(directive));
    (Arc::new(LoggingConfig::new(handle)), layer)
}
