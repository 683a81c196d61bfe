//! File logging. The terminal belongs to the grid while it runs, so nothing is
//! written to stderr; events go to a daily rolling file in the config directory.
//!
//! Filter with `RUST_LOG`, e.g. `RUST_LOG=workgrid=debug`.

use std::path::Path;

use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE_NAME: &str = "workgrid.log";

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init(log_dir: &Path, debug: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to initialize logging: {}", e))?;

    Ok(guard)
}
