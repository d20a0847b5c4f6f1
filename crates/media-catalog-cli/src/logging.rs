use std::env;
use std::path::Path;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/media-catalog.log";

/// Console output goes to stderr so listings on stdout stay clean. The file
/// layer is flushed when the returned guard drops.
pub fn init_logger() -> impl Drop {
    let filter = env::var("TRACING_LEVEL")
        .unwrap_or_else(|_| "warn,media_catalog=info,media_catalog_core=info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let log_file_path = Path::new(&log_file_path);
    let log_dir = log_file_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_name = log_file_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "media-catalog.log".into());

    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    info!("Logging to {}", log_file_path.display());

    guard
}
