use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::Path;

use sparkbars::LogSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the log writer thread alive; drop it last.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Routes tracing output to a file. The terminal belongs to the UI, so nothing goes to stdout.
pub fn init(settings: &LogSettings, file_override: Option<&Path>) -> Result<LogGuard> {
    let path = file_override.unwrap_or(&settings.file);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {:?}", dir))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create log file: {:?}", path))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG takes precedence over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(filter);

    tracing_subscriber::registry().with(file_layer).init();
    tracing::info!(level = %settings.level, file = ?path, "logging initialized");

    Ok(LogGuard { _guard: guard })
}
