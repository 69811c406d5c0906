use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with both console and file output.
///
/// The returned guard flushes the file writer when dropped, so the caller
/// keeps it alive for the duration of the process.
pub fn init_logging(log_dir: &Path) -> WorkerGuard {
    // Ensure logs directory exists
    let _ = fs::create_dir_all(log_dir);

    // Create a non-blocking file appender for daily log rotation
    let file_appender = tracing_appender::rolling::daily(log_dir, "tolldata_etl.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    // JSON layer for the log file
    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    // Console logs go to stderr; stdout is reserved for command output
    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    // Respect RUST_LOG if set; otherwise info for our crate
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tolldata_etl=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}
