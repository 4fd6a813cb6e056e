//! Structured logging setup using `tracing-subscriber` and `tracing-appender`.
//!
//! Two modes:
//! - **File** ([`init_file`]): daily-rotated JSON file layer + stderr console layer
//! - **CLI** ([`init_cli`]): stderr only
//!
//! Both honour `RUST_LOG` and fall back to the configured level.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Log file prefix inside the logs directory.
pub const LOG_FILE_PREFIX: &str = "huddle.log";

/// Holds the non-blocking writer guard for file logging.
///
/// The [`WorkerGuard`] must be kept alive for the duration of the process.
/// Dropping it flushes pending log entries and closes the file.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// Initialise file logging.
///
/// Writes JSON logs to `{logs_dir}/huddle.log.YYYY-MM-DD` with daily rotation
/// and mirrors human-readable output to stderr.
///
/// # Errors
///
/// Returns an error if the logs directory cannot be created or a global
/// subscriber is already installed.
pub fn init_file(logs_dir: &Path, default_level: &str) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir).map_err(|e| {
        anyhow::anyhow!(
            "failed to create logs directory {}: {e}",
            logs_dir.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(json_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(LoggingGuard { _guard: guard })
}

/// Initialise console-only logging on stderr.
pub fn init_cli(default_level: &str) {
    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Pick the mode from configuration. Returns a guard only in file mode.
///
/// # Errors
///
/// Returns an error if file logging was requested and cannot be set up.
pub fn init_from_config(config: &LoggingConfig) -> anyhow::Result<Option<LoggingGuard>> {
    match &config.dir {
        Some(dir) => init_file(dir, &config.level).map(Some),
        None => {
            init_cli(&config.level);
            Ok(None)
        }
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
