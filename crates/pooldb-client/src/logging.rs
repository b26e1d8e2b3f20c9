//! Leveled console and log-file output.
//!
//! Every record is written as
//!
//! ```text
//! [14/10/2026 09:30:12] [INFO]: connection pool created alias="default"
//! ```
//!
//! to the console (warnings and errors on stderr, the rest on stdout) and,
//! when enabled, appended to `<log_dir>/application.log` from a background
//! writer. A log file that cannot be opened is reported on stderr and never
//! surfaces to the caller.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Local;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Environment variable holding the log threshold.
pub const ENV_LOG_LEVEL: &str = "DB_LOG_LEVEL";
/// Environment variable holding the log directory.
pub const ENV_LOG_DIR: &str = "DB_LOG_DIR";
/// Environment variable toggling the log file.
pub const ENV_LOG_TO_FILE: &str = "DB_LOG_TO_FILE";

/// Name of the log file inside the log directory.
pub const LOG_FILE_NAME: &str = "application.log";

/// `chrono` format of the record timestamp.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Log threshold. Records below it are suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    /// Everything from info up.
    #[default]
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Whether a record at `level` passes this threshold.
    #[must_use]
    pub fn allows(self, level: LogLevel) -> bool {
        level >= self
    }

    /// Equivalent `tracing` filter.
    #[must_use]
    pub fn as_filter(self) -> LevelFilter {
        match self {
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
        }
    }

    /// Lower-case name, as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A log level name that is not `info`, `warn` or `error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{0}', expected info, warn or error")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Threshold.
    pub level: LogLevel,
    /// Append records to the log file.
    pub log_to_file: bool,
    /// Directory holding the log file.
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_to_file: true,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl LogConfig {
    /// Read `DB_LOG_LEVEL`, `DB_LOG_DIR` and `DB_LOG_TO_FILE`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the logging settings from an arbitrary key lookup.
    ///
    /// Unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let level = lookup(ENV_LOG_LEVEL)
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.level);
        let log_to_file = lookup(ENV_LOG_TO_FILE)
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.log_to_file);
        let log_dir = lookup(ENV_LOG_DIR)
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.log_dir, PathBuf::from);

        Self {
            level,
            log_to_file,
            log_dir,
        }
    }

    /// Set the threshold.
    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Enable or disable the log file.
    #[must_use]
    pub fn log_to_file(mut self, enabled: bool) -> Self {
        self.log_to_file = enabled;
        self
    }

    /// Set the log directory.
    #[must_use]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// Full path of the log file.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Errors from [`init`].
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Keeps the background log-file writer running.
///
/// Records still queued are flushed when the guard is dropped, so hold it
/// for the life of the process.
#[must_use = "dropping the guard stops the log-file writer"]
#[derive(Debug)]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `config.level` when set. If the log file cannot be
/// opened, file output is disabled and the failure is reported on stderr.
pub fn init(config: &LogConfig) -> Result<LogGuard, LoggingError> {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level.as_filter().into())
        .from_env_lossy();

    let console = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(BracketFormat::new())
        .with_writer(io::stderr.with_max_level(Level::WARN).or_else(io::stdout));

    let (writer, guard) = file_writer(config).unzip();
    let file = writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .event_format(BracketFormat::new())
            .with_writer(writer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;
    Ok(LogGuard { _file: guard })
}

fn file_writer(config: &LogConfig) -> Option<(NonBlocking, WorkerGuard)> {
    if !config.log_to_file {
        return None;
    }
    if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
        eprintln!(
            "failed to create log directory {}: {e}",
            config.log_dir.display()
        );
        return None;
    }

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(&config.log_dir);
    match appender {
        Ok(appender) => Some(tracing_appender::non_blocking(appender)),
        Err(e) => {
            eprintln!("failed to open log file {}: {e}", config.log_file().display());
            None
        }
    }
}

/// Event formatter producing `[timestamp] [LEVEL]: message fields`.
#[derive(Debug, Clone)]
pub struct BracketFormat {
    timestamp_format: &'static str,
}

impl BracketFormat {
    /// Formatter with [`TIMESTAMP_FORMAT`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            timestamp_format: TIMESTAMP_FORMAT,
        }
    }
}

impl Default for BracketFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, N> FormatEvent<S, N> for BracketFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "[{}] [{}]: ",
            Local::now().format(self.timestamp_format),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
