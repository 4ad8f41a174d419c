//! File-based logging
//!
//! Stdout carries the menu protocol, so tracing output goes to a file in the
//! cache directory and nowhere else.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_FILE_NAME: &str = "log";

/// Initialize the logging system.
///
/// Logs are appended to `<log_dir>/log`. The log level can be controlled via the
/// `RUST_LOG` environment variable; the default is DEBUG for this crate and
/// WARN for everything else.
///
/// The returned guard flushes buffered lines when dropped and must be kept
/// alive until shutdown.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    // The cache root may not exist yet on first run
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    // A single file, appended to across sessions
    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, LOG_FILE_NAME);

    // Non-blocking writer so file I/O stays off the session loop
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Set up the filter from RUST_LOG env var, or use defaults
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("yt_feed=debug,warn"));

    // File output only; stdout is reserved for screens
    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI colors in log files
        .with_target(true) // Include module path
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE); // Log when spans close

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs written to {}", log_dir.join(LOG_FILE_NAME).display());

    Ok(guard)
}

/// Log a provider request and its result
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "API request successful"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "API request failed"),
        }
    };
}

/// Log a provider request with additional context
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "API request started");
    };
}
