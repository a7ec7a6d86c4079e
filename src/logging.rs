use anyhow::Context;
use std::path::Path;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;

/// Flush handles for the file sinks; buffered lines are written out when
/// these are dropped, so hold them until the server has stopped.
#[must_use]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Console output always; outside production also JSON lines in
/// `<log_dir>/error.log` (errors only) and `<log_dir>/combined.log`.
pub fn init(config: &AppConfig) -> anyhow::Result<LogGuards> {
    let filter = EnvFilter::try_new(&config.logging.default_filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_dir = if config.is_production() {
        None
    } else {
        config.logging.log_dir.as_deref()
    };

    let mut guards = Vec::new();
    let (error_layer, combined_layer) = match log_dir {
        Some(dir) => {
            let (error_writer, error_guard) = file_writer(dir, "error.log")?;
            let (combined_writer, combined_guard) = file_writer(dir, "combined.log")?;
            guards.push(error_guard);
            guards.push(combined_guard);
            (
                Some(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(error_writer)
                        .with_filter(LevelFilter::ERROR),
                ),
                Some(fmt::layer().json().with_ansi(false).with_writer(combined_writer)),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(error_layer)
        .with(combined_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    if let Some(dir) = log_dir {
        tracing::info!("Writing log files to {}", dir.display());
    }
    Ok(LogGuards { _guards: guards })
}

/// Append-only file at `<dir>/<name>`, written from a background thread
fn file_writer(dir: &Path, name: &str) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .with_context(|| format!("failed to open log file {}", dir.join(name).display()))?;
    Ok(tracing_appender::non_blocking(appender))
}
