use std::fs;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

const DEFAULT_DIRECTIVE: &str = "whatsapp_assistant=info,tower_http=info";

/// Initializes console logging plus a daily-rolling JSON file under `config.directory`.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process. `None` means only console logging is active.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    match file_writer(config) {
        Ok((non_blocking_writer, guard)) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(non_blocking_writer))
                .with(fmt::layer().with_writer(std::io::stdout))
                .init();
            Some(guard)
        }
        // Containers may run with a read-only filesystem; fall back to console only
        Err(e) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stdout))
                .init();
            tracing::warn!(directory = %config.directory, error = %e, "File logging disabled");
            None
        }
    }
}

/// Daily-rolling non-blocking writer, or the error that prevented creating the log directory.
fn file_writer(config: &LoggingConfig) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(&config.directory)?;
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    Ok(tracing_appender::non_blocking(file_appender))
}
