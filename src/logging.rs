/// Structured logging for the aurora monitoring service
///
/// Provides context-rich logging with feed identifiers, timestamps, and
/// severity levels. Supports both console output and file-based logging
/// for long-running `watch` sessions.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::SpaceWeatherError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// NOAA Space Weather Prediction Center feeds
    Swpc,
    /// Open-Meteo local weather
    OpenMeteo,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Swpc => write!(f, "SWPC"),
            DataSource::OpenMeteo => write!(f, "OPEN-METEO"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. the real-time feed has a short gap
    Expected,
    /// Unexpected failure - indicates service degradation or a format change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, source: DataSource, feed: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = format_entry(level, source, feed, message);
        let feed_part = feed.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, feed_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, feed_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// One log line as written to the log file.
fn format_entry(level: LogLevel, source: DataSource, feed: Option<&str>, message: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let feed_part = feed.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, source, feed_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn with_logger(level: LogLevel, source: DataSource, feed: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, source, feed, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: DataSource, feed: Option<&str>, message: &str) {
    with_logger(LogLevel::Info, source, feed, message);
}

/// Log a warning message
pub fn warn(source: DataSource, feed: Option<&str>, message: &str) {
    with_logger(LogLevel::Warning, source, feed, message);
}

/// Log an error message
pub fn error(source: DataSource, feed: Option<&str>, message: &str) {
    with_logger(LogLevel::Error, source, feed, message);
}

/// Log a debug message
pub fn debug(source: DataSource, feed: Option<&str>, message: &str) {
    with_logger(LogLevel::Debug, source, feed, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a SWPC feed failure
pub fn classify_swpc_failure(err: &SpaceWeatherError) -> FailureType {
    match err {
        // The real-time solar wind feeds regularly carry null rows while the
        // spacecraft link is down; a short gap is normal.
        SpaceWeatherError::NoDataAvailable(_) => FailureType::Expected,
        SpaceWeatherError::HttpError(_)
        | SpaceWeatherError::RequestFailed(_)
        | SpaceWeatherError::ParseError(_) => FailureType::Unexpected,
        SpaceWeatherError::StaleData { .. }
        | SpaceWeatherError::InvalidMeasurement { .. }
        | SpaceWeatherError::ConfigError(_) => FailureType::Unknown,
    }
}

/// Classify an Open-Meteo failure
pub fn classify_weather_failure(err: &SpaceWeatherError) -> FailureType {
    match err {
        SpaceWeatherError::HttpError(_) | SpaceWeatherError::RequestFailed(_) => {
            FailureType::Unexpected
        }
        _ => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a data feed failure with automatic classification
pub fn log_feed_failure(source: DataSource, feed: &str, operation: &str, err: &SpaceWeatherError) {
    let failure_type = match source {
        DataSource::OpenMeteo => classify_weather_failure(err),
        _ => classify_swpc_failure(err),
    };

    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(source, Some(feed), &message),
        FailureType::Unexpected => error(source, Some(feed), &message),
        FailureType::Unknown => warn(source, Some(feed), &message),
    }
}

// ---------------------------------------------------------------------------
// Refresh Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one refresh cycle
pub fn log_refresh_summary(total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Refresh complete: {}/{} feeds successful, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info(DataSource::System, None, &message);
    } else if successful == 0 {
        error(DataSource::System, None, &message);
    } else {
        warn(DataSource::System, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        let gap = SpaceWeatherError::NoDataAvailable("plasma-1-day".to_string());
        assert_eq!(classify_swpc_failure(&gap), FailureType::Expected);

        let http_error = SpaceWeatherError::HttpError(500);
        assert_eq!(classify_swpc_failure(&http_error), FailureType::Unexpected);

        let stale = SpaceWeatherError::StaleData { feed: "plasma".to_string(), age_minutes: 90 };
        assert_eq!(classify_swpc_failure(&stale), FailureType::Unknown);

        assert_eq!(
            classify_weather_failure(&SpaceWeatherError::HttpError(429)),
            FailureType::Unexpected
        );
        assert_eq!(
            classify_weather_failure(&SpaceWeatherError::ParseError("missing field".to_string())),
            FailureType::Unknown
        );
    }

    #[test]
    fn test_timeouts_classify_by_variant_not_wording() {
        // reqwest reports timeouts as "operation timed out".
        let timeout = SpaceWeatherError::RequestFailed("operation timed out".to_string());
        assert_eq!(classify_weather_failure(&timeout), FailureType::Unexpected);
        assert_eq!(classify_swpc_failure(&timeout), FailureType::Unexpected);
    }

    #[test]
    fn test_entry_format_includes_source_and_feed() {
        let entry = format_entry(LogLevel::Warning, DataSource::Swpc, Some("mag"), "gap");
        assert!(entry.ends_with("WARN SWPC [mag]: gap"), "got '{}'", entry);
    }

    #[test]
    fn test_level_names_deserialize_from_config() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }
        let w: Wrapper = toml::from_str("level = \"warn\"").expect("alias should parse");
        assert_eq!(w.level, LogLevel::Warning);
        let w: Wrapper = toml::from_str("level = \"error\"").expect("name should parse");
        assert_eq!(w.level, LogLevel::Error);
    }
}
