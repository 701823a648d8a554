//! Subscriber setup for console and rolling JSON file output
//!
//! Console events go to stderr so that commands printing data (`keygen`,
//! `reveal`) keep stdout clean. File events are JSON, one per line.

use crate::config::LoggingConfig;
use crate::domain::{Result, TabmaskError};
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const LOG_FILE_PREFIX: &str = "tabmask.log";

/// Keeps the background file writer alive; dropping it flushes pending events
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    file_writer: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether events are also written to a log file
    pub fn has_file_writer(&self) -> bool {
        self.file_writer.is_some()
    }
}

/// How often the log file rolls over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl FromStr for LogRotation {
    type Err = TabmaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hourly" => Ok(LogRotation::Hourly),
            "daily" => Ok(LogRotation::Daily),
            "never" => Ok(LogRotation::Never),
            other => Err(TabmaskError::Configuration(format!(
                "Unknown log rotation '{other}'"
            ))),
        }
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` replaces the `tabmask=<level>` filter when set. Call once
/// per process and hold on to the returned guard.
///
/// # Errors
///
/// Returns [`TabmaskError::Configuration`] for an unknown level or rotation,
/// a log directory that cannot be created, or a second initialization.
///
/// # Example
///
/// ```no_run
/// use tabmask::config::LoggingConfig;
/// use tabmask::logging::init_logging;
///
/// let guard = init_logging("debug", &LoggingConfig::default()).unwrap();
/// tracing::debug!("visible");
/// drop(guard);
/// ```
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_level(level)?;

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter_for(level));

    let (file, file_writer) = match json_file_layer(level, config)? {
        Some((layer, guard)) => (Some(layer), Some(guard)),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file)
        .with(console)
        .try_init()
        .map_err(|e| TabmaskError::Configuration(format!("Failed to initialize logging: {e}")))?;

    tracing::debug!(
        %level,
        file = config.local_enabled,
        path = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard { file_writer })
}

fn filter_for(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("tabmask={level}")))
}

type FileLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn json_file_layer(level: Level, config: &LoggingConfig) -> Result<Option<(FileLayer, WorkerGuard)>> {
    if !config.local_enabled {
        return Ok(None);
    }

    let rotation: LogRotation = config.local_rotation.parse()?;
    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        TabmaskError::Configuration(format!(
            "Cannot create log directory {}: {e}",
            config.local_path
        ))
    })?;

    let appender = RollingFileAppender::new(rotation.into(), &config.local_path, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_thread_ids(true)
        .with_writer(writer)
        .with_filter(filter_for(level))
        .boxed();

    Ok(Some((layer, guard)))
}

fn parse_level(level: &str) -> Result<Level> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(TabmaskError::Configuration(format!(
            "Invalid log level '{level}'; expected trace, debug, info, warn or error"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_parse_in_any_case() {
        assert_eq!(parse_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_level("TRACE").unwrap(), Level::TRACE);
        assert_eq!(parse_level("Info").unwrap(), Level::INFO);
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("").is_err());
    }

    #[test]
    fn test_rotation_names() {
        assert_eq!("hourly".parse::<LogRotation>().unwrap(), LogRotation::Hourly);
        assert_eq!(Rotation::from(LogRotation::Never), Rotation::NEVER);
        assert!("weekly".parse::<LogRotation>().is_err());
    }

    #[test]
    fn test_disabled_file_logging_builds_no_layer() {
        let config = LoggingConfig {
            local_enabled: false,
            ..LoggingConfig::default()
        };
        let layer = json_file_layer(Level::INFO, &config).unwrap();
        assert!(layer.is_none());
    }
}
