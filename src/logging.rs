//! Tracing setup.
//!
//! The TUI owns the terminal, so interactive runs log to a daily rolling
//! file. Export runs log to stderr. `RUST_LOG` wins over the configured
//! filter.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingSettings;

/// Keeps the non-blocking writer flushing for the life of the process.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "nodewatch.log";

/// Used when neither `RUST_LOG` nor the configured filter parses.
const DEFAULT_FILTER: &str = "info";

fn env_filter(fallback: &str) -> EnvFilter {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_filter(from_env.as_deref(), fallback)
}

fn build_filter(from_env: Option<&str>, fallback: &str) -> EnvFilter {
    from_env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(fallback).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to `<directory>/nodewatch.log.<date>`.
pub fn init_file_logging(settings: &LoggingSettings) -> Result<()> {
    let directory: &Path = &settings.directory;
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory: {}", directory.display()))?;

    let appender = RollingFileAppender::new(Rotation::DAILY, directory, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(env_filter(&settings.filter));

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!(directory = %directory.display(), "Logging to file");
    Ok(())
}

/// Log to stderr, for non-interactive runs.
pub fn init_stderr_logging(settings: &LoggingSettings) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter(&settings.filter));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .try_init()
        .context("installing tracing subscriber")
}
