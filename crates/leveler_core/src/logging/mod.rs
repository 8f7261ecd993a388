//! Logging infrastructure.
//!
//! Mirrors the original tool's dual output: human-readable lines on stderr
//! plus a `leveler.log` file in the configured directory, both driven by
//! the `tracing` ecosystem.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Name of the log file created in the configured log directory.
pub const LOG_FILE_NAME: &str = "leveler.log";

/// Initialize the global tracing subscriber.
///
/// Sets up two layers:
/// - stderr output, filtered by RUST_LOG with `default_level` as fallback
/// - a non-blocking appender writing to `leveler.log` in `log_dir`
///
/// Returns the appender guard; the caller must keep it alive for the
/// process lifetime or buffered log lines are dropped on exit.
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: &str, log_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(fmt::layer().with_target(false).with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_log_directory_and_file() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");

        // Global subscriber can only be installed once per process; the
        // interesting part here is directory/file creation.
        let guard = init_tracing("info", &log_dir).unwrap();
        tracing::info!("log line");
        drop(guard);

        assert!(log_dir.join(LOG_FILE_NAME).exists());
    }
}
