//! Tracing subscriber setup.

use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use recall_config::{LogFormat, LoggingConfig};

use crate::error::EngineError;

/// Days of rolled log files kept on disk.
const MAX_LOG_FILES: usize = 30;

// Keeps the non-blocking file writer flushing for the life of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), EngineError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| EngineError::Telemetry(format!("invalid log level: {}", e)))?;

    let console = match config.format {
        LogFormat::Pretty => fmt::layer().with_target(true).with_ansi(true).boxed(),
        LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
    };

    let file = if config.file {
        let log_dir = config.log_directory();
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| EngineError::Telemetry(format!("{}: {}", log_dir.display(), e)))?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("recall")
            .filename_suffix("log")
            .max_log_files(MAX_LOG_FILES)
            .build(&log_dir)
            .map_err(|e| EngineError::Telemetry(e.to_string()))?;

        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| EngineError::Telemetry(e.to_string()))
}
