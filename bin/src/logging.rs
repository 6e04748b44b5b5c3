//! File-only structured logging.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, registry};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str =
    "warn,tubedrop=debug,tubedrop_watch=debug,tubedrop_auth=debug,tubedrop_upload=debug";

/// Installs a JSON subscriber that appends to `log_file` and nothing else.
///
/// The returned guard flushes buffered lines when dropped, so keep it alive
/// until the process is about to exit.
pub(crate) fn init(log_file: &Path) -> Result<WorkerGuard> {
    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", log_file.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("Could not open log file {}", log_file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let file_layer = layer().with_ansi(false).json().with_writer(writer);

    registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("Could not initialize the logger")?;

    Ok(guard)
}
