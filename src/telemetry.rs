//! Logging setup: colored stderr plus a JSON rolling log file.

use std::ffi::OsStr;
use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber for a binary named `app`.
///
/// The stderr layer honours `RUST_LOG` on top of `stderr_level`. The file
/// layer writes JSON to `LOG_FILE_PATH` (default `logs/<app>.log`), rotated
/// daily and filtered by `RUST_LOG_JSON` on top of `debug`.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init(app: &str, stderr_level: LevelFilter) -> WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| format!("logs/{app}.log"));
    let log_path = Path::new(&log_file_path);
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let default_name = format!("{app}.log");
    let log_file_name = log_path
        .file_name()
        .unwrap_or(OsStr::new(&default_name));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(stderr_level.into()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive(LevelFilter::DEBUG.into()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    guard
}
