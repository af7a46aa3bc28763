//! Logging infrastructure for episync.
//!
//! This module provides:
//! - Global `tracing` setup (console, optionally a daily log file)
//! - Per-episode alignment logs with a tail buffer for error diagnosis
//!
//! # Example
//!
//! ```no_run
//! use episync_core::logging::{EpisodeLogger, LogConfig};
//!
//! let logger = EpisodeLogger::new("show_s01e03", ".logs", LogConfig::default()).unwrap();
//!
//! logger.phase("Speech detection");
//! logger.tool_output("[silencedetect @ 0x55] silence_end: 4.2 | silence_duration: 1.1");
//! logger.success("jp offset 480ms (high)");
//! ```

mod episode_logger;
mod types;

use std::path::Path;

pub use episode_logger::EpisodeLogger;
pub(crate) use episode_logger::file_safe;
pub use types::{LogConfig, LogLevel, Marker};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// Honors `RUST_LOG`, falling back to `default_level`. Output goes to
/// stderr so stdout stays clean for `--json`.
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(env_filter(default_level))
        .init();
}

/// Initialize tracing with an additional daily-rolling log file.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the lifetime of the program.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(logs_dir, "episync.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(env_filter(default_level))
        .init();

    guard
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
    }
}
