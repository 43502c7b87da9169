//! # Local Logger
//!
//! Installs the process-wide `tracing` subscriber:
//! - an `EnvFilter` (`RUST_LOG` wins over the configured level),
//! - a coloured console layer on stderr, leaving stdout to the dashboard,
//! - optionally a JSON layer writing to a daily rolling file in `log_dir`,
//!   keeping the most recent `MAX_LOG_FILES` files.
//!
//! The returned `WorkerGuard` flushes the file writer when dropped; keep it
//! alive for the lifetime of `main`.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Rolled files kept in `log_dir`, current one included.
pub const MAX_LOG_FILES: usize = 7;

/// Builds the level filter. `RUST_LOG` takes precedence over `log_level`;
/// `fatal` is accepted as an alias for `error`.
pub fn build_filter(log_level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = match log_level.trim().to_ascii_lowercase().as_str() {
        "fatal" => "error".to_string(),
        "" => "info".to_string(),
        other => other.to_string(),
    };
    EnvFilter::try_new(&directive).with_context(|| format!("invalid log level '{}'", log_level))
}

/// Human-readable console output. `setup_logging` points it at stderr.
fn console_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer().with_target(true).with_ansi(true).with_writer(writer)
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn setup_logging(app_name: &str, log_dir: Option<&Path>, log_level: &str) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(log_level)?;

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("cannot create log dir {}", dir.display()))?;
            }
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(app_name)
                .filename_suffix("log")
                .max_log_files(MAX_LOG_FILES)
                .build(dir)
                .with_context(|| format!("cannot open log file in {}", dir.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    tracing::info!(level = log_level, file = log_dir.is_some(), "logging initialized");
    Ok(guard)
}
