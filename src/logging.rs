//! Tracing setup for hosts embedding the engine

use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to prepare log directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Logging is already initialized")]
    AlreadyInitialized,
}

/// Install a global subscriber writing to `log_path`.
///
/// `directive` uses `EnvFilter` syntax (e.g. `"info"` or `"update_sync=debug"`).
/// The returned guard flushes the non-blocking writer on drop, so the host
/// must keep it alive for as long as it wants logs written.
pub fn init_logging(log_path: &Path, directive: &str) -> Result<WorkerGuard, LoggingError> {
    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .map(Path::new)
        .unwrap_or_else(|| Path::new("update-sync.log"));

    std::fs::create_dir_all(dir)?;
    let filter = EnvFilter::try_new(directive)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(guard)
}
