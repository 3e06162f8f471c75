//! Structured logging using tracing.
//!
//! Provides:
//! - Console output on stderr, its level picked by the `-v` count
//! - Optional JSON file output with daily rotation
//!
//! `RUST_LOG` overrides the console filter.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file name prefix ("jamlist" -> "jamlist.2024-01-15").
pub const LOG_FILE_PREFIX: &str = "jamlist";

/// Logging configuration options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for JSON log files. No file output when `None`.
    pub log_directory: Option<PathBuf>,
    /// Log file name prefix.
    pub log_file_prefix: String,
    /// Maximum log level for console output.
    pub console_level: Level,
    /// Maximum log level for file output.
    pub file_level: Level,
    /// Whether to include ANSI color codes in console output.
    pub console_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from_verbosity(0)
    }
}

impl LoggingConfig {
    /// Configuration for a `-v` count: 0 = warn, 1 = info, 2 = debug, 3+ = trace.
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let console_level = level_for_verbosity(verbosity);
        Self {
            log_directory: None,
            log_file_prefix: LOG_FILE_PREFIX.to_string(),
            console_level,
            file_level: if console_level < Level::DEBUG {
                Level::DEBUG
            } else {
                console_level
            },
            console_ansi: true,
        }
    }

    /// Set the log directory.
    #[must_use]
    pub fn with_log_directory(mut self, path: Option<PathBuf>) -> Self {
        self.log_directory = path;
        self
    }

    /// Enable or disable colored console output.
    #[must_use]
    pub const fn with_console_ansi(mut self, ansi: bool) -> Self {
        self.console_ansi = ansi;
        self
    }
}

/// Guard that keeps file logging active. Drop this to flush and close log files.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system with the given configuration.
///
/// Returns a guard that must be kept alive for the duration of the run.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(crate_directives(config.console_level)));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.console_ansi)
        .with_target(config.console_level >= Level::DEBUG)
        .without_time()
        .with_filter(console_filter);

    let (file_layer, file_guard) = match &config.log_directory {
        Some(dir) => {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    LoggingError::DirectoryCreationFailed {
                        path: dir.clone(),
                        reason: e.to_string(),
                    }
                })?;
            }
            let appender = tracing_appender::rolling::daily(dir, &config.log_file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(EnvFilter::new(crate_directives(config.file_level)));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Console level for a `-v` count.
#[must_use]
pub const fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter directives: warnings from dependencies, `level` for our crates.
fn crate_directives(level: Level) -> String {
    let level = level_to_directive(level);
    format!("warn,jamlist={level},jamlist_core={level}")
}

/// Convert a tracing Level to a filter directive string.
const fn level_to_directive(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create the log directory.
    #[error("Failed to create log directory {}: {reason}", .path.display())]
    DirectoryCreationFailed {
        /// The path that could not be created.
        path: PathBuf,
        /// The reason for the failure.
        reason: String,
    },
    /// A global subscriber is already set.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}
