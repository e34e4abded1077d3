use anyhow::Context;
use docparse_core::Settings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE: &str = "docparse.log";

/// Install a file-backed subscriber when a log directory is configured.
///
/// stdout carries the JSON result and stderr stays silent, so there is no
/// console layer. Returns the writer guard, which must stay alive until the
/// last event has been logged; dropping it flushes the file.
pub fn init(settings: &Settings) -> anyhow::Result<Option<WorkerGuard>> {
    let Some(dir) = settings.log_dir.as_deref() else {
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(dir)
        .with_context(|| format!("opening {LOG_FILE} in {}", dir.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(&settings.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(docparse_core::config_file::DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(Some(guard))
}
