//! Diagnostic logging.
//!
//! Logs go to `<data_dir>/studylog.log` (see `[logging]` in the config).
//! `RUST_LOG` takes precedence over the configured level.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::schema::LoggingConfig;

/// Keeps the background writer alive; pending lines are flushed on drop.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Install the global subscriber writing to `data_dir`.
///
/// Returns `Ok(None)` when logging is disabled.
pub fn init(config: &LoggingConfig, data_dir: &Path) -> Result<Option<LoggingGuard>> {
    if !config.enabled {
        return Ok(None);
    }

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create log directory {}", data_dir.display()))?;

    let appender = tracing_appender::rolling::never(data_dir, &config.file);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("failed to install log subscriber")?;

    tracing::debug!(
        path = %log_file_path(config, data_dir).display(),
        level = %config.level,
        "logging initialized"
    );

    Ok(Some(LoggingGuard { _guard: guard }))
}

pub fn log_file_path(config: &LoggingConfig, data_dir: &Path) -> PathBuf {
    data_dir.join(&config.file)
}
