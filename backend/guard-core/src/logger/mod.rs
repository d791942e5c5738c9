//! Structured logging with a bounded local error buffer.
//!
//! One [`Logger`] is constructed at startup and shared as `Arc<Logger>`
//! with every other component.
//!
//! # Output rules
//! - Error events always go to the local ring buffer, even when the
//!   logger is disabled.
//! - The logger is enabled in development, or in production when error
//!   tracking is switched on.
//! - Development writes every event to the `log` facade (see
//!   [`console::init_console`]).
//! - Production forwards error and warning events to the optional
//!   [`ErrorSink`].
//! - Data payloads are masked before they are recorded anywhere.

pub mod console;
pub mod ring_buffer;
pub mod sink;

pub use console::init_console;
pub use ring_buffer::{ERROR_BUFFER_CAPACITY, ErrorBuffer};
pub use sink::{ErrorSink, HttpErrorSink};

use crate::security::mask_sensitive;

use models::{AppMode, LogEvent, LogLevel};

use std::fmt;
use std::time::SystemTime;

use humantime::format_rfc3339_millis;
use serde_json::Value;

const LOG_TARGET: &str = "client_guard";

/// Settings fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerConfig {
    pub mode: AppMode,
    pub error_tracking_enabled: bool,
    pub buffer_capacity: usize,
}

impl LoggerConfig {
    pub fn new(mode: AppMode, error_tracking_enabled: bool) -> Self {
        Self {
            mode,
            error_tracking_enabled,
            buffer_capacity: ERROR_BUFFER_CAPACITY,
        }
    }

    pub fn development() -> Self {
        Self::new(AppMode::Development, false)
    }

    pub fn production(error_tracking_enabled: bool) -> Self {
        Self::new(AppMode::Production, error_tracking_enabled)
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::development()
    }
}

pub struct Logger {
    config: LoggerConfig,
    errors: ErrorBuffer,
    sink: Option<Box<dyn ErrorSink>>,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            errors: ErrorBuffer::new(config.buffer_capacity),
            config,
            sink: None,
        }
    }

    /// Attach the production forwarding target.
    pub fn with_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn mode(&self) -> AppMode {
        self.config.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.config.mode.is_development() || self.config.error_tracking_enabled
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>, data: Option<Value>) {
        let event = LogEvent {
            timestamp: format_rfc3339_millis(SystemTime::now()).to_string(),
            level,
            message: message.into(),
            data: data.map(|value| mask_sensitive(&value)),
            environment: self.config.mode,
        };

        if level == LogLevel::Error {
            self.errors.push(event.clone());
        }

        if !self.is_enabled() {
            return;
        }

        match self.config.mode {
            AppMode::Development => write_console(&event),
            AppMode::Production => {
                if matches!(level, LogLevel::Error | LogLevel::Warn) {
                    self.forward(&event);
                }
            }
        }
    }

    pub fn error(&self, message: impl Into<String>, data: Option<Value>) {
        self.log(LogLevel::Error, message, data);
    }

    pub fn warn(&self, message: impl Into<String>, data: Option<Value>) {
        self.log(LogLevel::Warn, message, data);
    }

    pub fn info(&self, message: impl Into<String>, data: Option<Value>) {
        self.log(LogLevel::Info, message, data);
    }

    /// No-op outside development.
    pub fn debug(&self, message: impl Into<String>, data: Option<Value>) {
        if self.config.mode.is_development() {
            self.log(LogLevel::Debug, message, data);
        }
    }

    /// Retained error events, oldest first.
    pub fn stored_errors(&self) -> Vec<LogEvent> {
        self.errors.snapshot()
    }

    pub fn clear_stored_errors(&self) {
        self.errors.clear();
    }

    fn forward(&self, event: &LogEvent) {
        let Some(sink) = &self.sink else {
            return;
        };

        if let Err(e) = sink.forward(event) {
            // Report through the facade only; logging through `self` here
            // would recurse into the sink.
            log::warn!(target: LOG_TARGET, "Dropped {} event: {e}", event.level);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .field("stored_errors", &self.errors.len())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

fn facade_level(level: LogLevel) -> log::Level {
    match level {
        LogLevel::Error => log::Level::Error,
        LogLevel::Warn => log::Level::Warn,
        LogLevel::Info => log::Level::Info,
        LogLevel::Debug => log::Level::Debug,
    }
}

fn write_console(event: &LogEvent) {
    let level = facade_level(event.level);
    match &event.data {
        Some(data) => log::log!(target: LOG_TARGET, level, "{} {}", event.message, data),
        None => log::log!(target: LOG_TARGET, level, "{}", event.message),
    }
}
