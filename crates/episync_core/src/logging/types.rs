//! Log levels, episode log options and report markers.

use serde::{Deserialize, Serialize};

use crate::config::LoggingSettings;

/// Severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Options for an [`EpisodeLogger`](super::EpisodeLogger).
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Lines below this level are dropped.
    pub level: LogLevel,
    /// Keep tool output in the tail buffer only.
    pub compact: bool,
    /// Tool output lines remembered for [`dump_tail`](super::EpisodeLogger::dump_tail).
    pub error_tail: usize,
    /// Prefix lines with `[HH:MM:SS]`.
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from(&LoggingSettings::default())
    }
}

impl From<&LoggingSettings> for LogConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level,
            compact: settings.compact,
            error_tail: settings.error_tail as usize,
            show_timestamps: true,
        }
    }
}

/// Structural markers in an episode report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `=== name ===`
    Phase,
    /// `--- name ---`
    Section,
    /// `[OK] message`
    Success,
    /// `[WARN] message`
    Warning,
    /// `[ERROR] message`
    Error,
}

impl Marker {
    /// Decorate `text` with this marker.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Marker::Phase => format!("=== {} ===", text),
            Marker::Section => format!("--- {} ---", text),
            Marker::Success => format!("[OK] {}", text),
            Marker::Warning => format!("[WARN] {}", text),
            Marker::Error => format!("[ERROR] {}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers() {
        assert_eq!(Marker::Phase.apply("Reference"), "=== Reference ===");
        assert_eq!(Marker::Warning.apply("low"), "[WARN] low");
        assert_eq!(Marker::Success.apply("jp 480ms"), "[OK] jp 480ms");
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
    }

    #[test]
    fn config_from_settings() {
        let settings = LoggingSettings {
            level: LogLevel::Debug,
            compact: false,
            error_tail: 7,
        };
        let config = LogConfig::from(&settings);
        assert_eq!(config.level, LogLevel::Debug);
        assert!(!config.compact);
        assert_eq!(config.error_tail, 7);

        let default = LogConfig::default();
        assert_eq!(default.level, LogLevel::Info);
        assert_eq!(default.error_tail, 20);
    }
}
