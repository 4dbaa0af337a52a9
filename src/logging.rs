//! Logging setup: human-readable lines on stderr plus one log file per run.

use std::error::Error;
use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// File level when `RUST_LOG` is not set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Console level unless `--verbose` is given; job progress is printed on
/// stdout separately
pub const CONSOLE_LOG_LEVEL: &str = "error";

/// `YYYYmmdd_HHMMSS` for the current local time
pub fn log_file_stem() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Install the global subscriber.
///
/// The file gets everything at `RUST_LOG` (or `info`), stderr only what
/// passes `console_level`. The returned guard flushes the file writer when
/// dropped, so keep it alive until the process exits. If the log file can't
/// be created, logging continues on stderr only.
pub fn init_logging(
    log_dir: &Path,
    console_level: &str,
) -> Result<Option<WorkerGuard>, Box<dyn Error>> {
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(console_level));

    let (file_layer, guard) = match open_log_file(log_dir) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer)
                .with_filter(file_filter());
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("no log file in {}: {}", log_dir.display(), e);
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| format!("failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

fn open_log_file(log_dir: &Path) -> Result<RollingFileAppender, Box<dyn Error>> {
    fs::create_dir_all(log_dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(log_file_stem())
        .filename_suffix("log")
        .build(log_dir)?;
    Ok(appender)
}

fn file_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}
