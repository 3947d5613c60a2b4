use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "logs";

/// Path of today's log file.
pub fn log_file_path() -> PathBuf {
    PathBuf::from(LOG_DIR).join(format!(
        "stock-tracker-{}.log",
        chrono::Utc::now().format("%Y%m%d")
    ))
}

/// Initialize console + file logging.
///
/// The returned guard must stay alive for the process lifetime so
/// buffered log lines are flushed on exit.
pub fn init(debug: bool) -> Result<WorkerGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    std::fs::create_dir_all(LOG_DIR)?;
    let log_file = std::fs::File::options()
        .create(true)
        .append(true)
        .open(log_file_path())?;
    let (file_writer, guard) = tracing_appender::non_blocking(log_file);

    let multi_writer = std::io::stderr.and(file_writer);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(multi_writer)
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();

    Ok(guard)
}
