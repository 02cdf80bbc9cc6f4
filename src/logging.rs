//! Root logger setup.
//!
//! Installs a global `tracing` subscriber that writes either structured JSON
//! lines or human-readable text to stderr at a configured maximum level,
//! leaving stdout to the program's own output.

use crate::config::Specifier;
use crate::profile::Profile;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

/// Logging verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

/// Unrecognized log level name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" | "fatal" | "panic" => Ok(LogLevel::Error),
            "off" | "disabled" => Ok(LogLevel::Off),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Maximum `tracing` level for this verbosity.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root logger settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Human-readable text instead of JSON lines.
    pub unstructured: bool,
}

/// Whether to log unstructured text.
///
/// An explicit setting always wins. When nothing specified it, every
/// profile except production gets unstructured output.
pub fn use_unstructured(configured: bool, specifier: Specifier, profile: Profile) -> bool {
    if specifier == Specifier::None && profile != Profile::Production {
        return true;
    }
    configured
}

/// Install the global subscriber.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case the existing one is kept.
pub fn init(config: &LoggingConfig) -> bool {
    let builder = FmtSubscriber::builder()
        .with_max_level(config.level.to_level_filter())
        .with_writer(std::io::stderr);

    let result = if config.unstructured {
        builder.compact().try_init()
    } else {
        builder.json().with_current_span(false).try_init()
    };

    match result {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, "global logger already installed; keeping it");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!(" INFO ".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("Debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("fatal".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!("disabled".parse::<LogLevel>(), Ok(LogLevel::Off));
        assert_eq!(
            "loud".parse::<LogLevel>(),
            Err(ParseLevelError("loud".to_string()))
        );
    }

    #[test]
    fn test_level_filters() {
        assert_eq!(LogLevel::Trace.to_level_filter(), LevelFilter::TRACE);
        assert_eq!(LogLevel::Warn.to_level_filter(), LevelFilter::WARN);
        assert_eq!(LogLevel::Off.to_level_filter(), LevelFilter::OFF);
    }

    #[test]
    fn test_level_roundtrip() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
            LogLevel::Off,
        ] {
            assert_eq!(level.as_str().parse::<LogLevel>(), Ok(level));
        }
    }

    #[test]
    fn test_unstructured_selection() {
        // Unspecified: production stays structured, others switch to text
        assert!(!use_unstructured(false, Specifier::None, Profile::Production));
        assert!(use_unstructured(false, Specifier::None, Profile::Development));
        assert!(use_unstructured(false, Specifier::None, Profile::Test));

        // Explicit settings are honored
        assert!(!use_unstructured(false, Specifier::File, Profile::Development));
        assert!(use_unstructured(true, Specifier::EnvironmentVar, Profile::Production));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            ParseLevelError("loud".to_string()).to_string(),
            "unknown log level 'loud'"
        );
    }
}
