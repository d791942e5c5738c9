//! Console + file output for the `log` facade.
//!
//! This is the development sink the [`Logger`](super::Logger) writes to.

use crate::error::logger::LoggerError;

use common::ErrorLocation;
use models::AppMode;

use std::io::stdout;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

static INIT_CONSOLE_ONCE: Once = Once::new();

static CONSOLE_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "client-guard.log";

/// Most verbose level passed through for a mode.
pub fn level_for(mode: AppMode) -> LevelFilter {
    match mode {
        AppMode::Development => LevelFilter::Debug,
        AppMode::Production => LevelFilter::Info,
    }
}

/// Install colored stdout + plain file output as the global logger.
///
/// Safe to call more than once; later calls log a warning and return Ok.
///
/// # Errors
///
/// Returns [`LoggerError::Init`] if the log file cannot be created or a
/// global logger is already installed by someone else.
pub fn init_console(log_dir: &Path, mode: AppMode) -> Result<(), LoggerError> {
    if CONSOLE_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Console logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_CONSOLE_ONCE.call_once(|| {
        result = init_console_internal(log_dir, mode);
        if result.is_ok() {
            info!("Console logger initialized ({mode}, level {:?})", level_for(mode));
        }
    });

    result
}

#[track_caller]
fn init_console_internal(log_dir: &Path, mode: AppMode) -> Result<(), LoggerError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{target}]",
                date = format_rfc3339(SystemTime::now()),
                level = colors.color(record.level()),
                message = message,
                target = record.target(),
            ))
        })
        .chain(stdout());

    let file_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                message = message,
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0)
            ))
        })
        .chain(
            fern::log_file(&log_file_path).map_err(|e| LoggerError::Init {
                message: format!("Failed to create log file: {e}"),
                location: ErrorLocation::from(std::panic::Location::caller()),
            })?,
        );

    Dispatch::new()
        .level(level_for(mode))
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| LoggerError::Init {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(std::panic::Location::caller()),
        })?;

    Ok(())
}
