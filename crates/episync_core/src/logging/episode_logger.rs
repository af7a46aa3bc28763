//! Human-readable report of one episode's alignment.
//!
//! Written to `<log_dir>/<episode>.log`. Tool output (ffmpeg lines) is
//! kept in a bounded tail so a failing run can dump the last lines it saw.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;
use serde::Serialize;

use super::types::{LogConfig, LogLevel, Marker};
use crate::scoring::ScoreSample;

struct Sink {
    writer: Option<BufWriter<File>>,
    tail: VecDeque<String>,
}

/// Per-episode report log.
pub struct EpisodeLogger {
    episode: String,
    log_path: PathBuf,
    config: LogConfig,
    sink: Mutex<Sink>,
}

impl EpisodeLogger {
    /// Open (and truncate) the log for `episode` inside `log_dir`.
    pub fn new(
        episode: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
    ) -> io::Result<Self> {
        let episode = episode.into();
        fs::create_dir_all(log_dir.as_ref())?;

        let log_path = log_dir
            .as_ref()
            .join(format!("{}.log", file_safe(&episode)));
        let writer = BufWriter::new(File::create(&log_path)?);

        Ok(Self {
            sink: Mutex::new(Sink {
                writer: Some(writer),
                tail: VecDeque::with_capacity(config.error_tail),
            }),
            episode,
            log_path,
            config,
        })
    }

    /// Episode name as given, before making it file-safe.
    pub fn episode(&self) -> &str {
        &self.episode
    }

    /// Path of the report file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Write `message` if `level` passes the configured minimum.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level >= self.config.level {
            self.emit(message);
        }
    }

    /// Plain line at info level.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Plain line at debug level. Dropped at the default level.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// `[WARN]` line.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &Marker::Warning.apply(message));
    }

    /// `[ERROR]` line.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &Marker::Error.apply(message));
    }

    /// `=== name ===` header opening a pipeline phase.
    pub fn phase(&self, name: &str) {
        self.info(&Marker::Phase.apply(name));
    }

    /// `--- name ---` header inside a phase.
    pub fn section(&self, name: &str) {
        self.info(&Marker::Section.apply(name));
    }

    /// `[OK]` line.
    pub fn success(&self, message: &str) {
        self.info(&Marker::Success.apply(message));
    }

    /// Ranked candidate offsets for one track.
    pub fn candidates(&self, track: &str, samples: &[ScoreSample]) {
        self.section(&format!("{} candidates", track));
        for (rank, s) in samples.iter().enumerate() {
            let mut line = format!(
                "#{} offset={}ms score={:.4} ratio={:.4}",
                rank + 1,
                s.offset_ms,
                s.score,
                s.overlap_ratio
            );
            if let Some(boundary) = s.boundary_score {
                line.push_str(&format!(" boundary={:.4}", boundary));
            }
            self.info(&line);
        }
    }

    /// Pretty JSON of any serializable value under a section header.
    pub fn json<T: Serialize>(&self, label: &str, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => {
                self.section(label);
                self.info(&json);
            }
            Err(e) => self.warn(&format!("{} is not serializable: {}", label, e)),
        }
    }

    /// One line of external tool output.
    ///
    /// Always remembered in the tail; written to the file only when the
    /// logger is not compact.
    pub fn tool_output(&self, line: &str) {
        if self.config.error_tail > 0 {
            let mut sink = self.sink.lock();
            while sink.tail.len() >= self.config.error_tail {
                sink.tail.pop_front();
            }
            sink.tail.push_back(line.to_string());
        }

        if !self.config.compact {
            self.emit(line);
        }
    }

    /// Write the remembered tool output under `[<source>/tail]`.
    pub fn dump_tail(&self, source: &str) {
        let lines = self.tail();
        if lines.is_empty() {
            return;
        }

        self.emit(&format!("[{}/tail]", source));
        for line in &lines {
            self.emit(line);
        }
    }

    /// Remembered tool output, oldest first.
    pub fn tail(&self) -> Vec<String> {
        self.sink.lock().tail.iter().cloned().collect()
    }

    /// Flush buffered lines to disk.
    pub fn flush(&self) {
        if let Some(writer) = self.sink.lock().writer.as_mut() {
            let _ = writer.flush();
        }
    }

    /// Flush and release the file. Later lines are discarded.
    pub fn close(&self) {
        if let Some(mut writer) = self.sink.lock().writer.take() {
            let _ = writer.flush();
        }
    }

    fn emit(&self, message: &str) {
        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        };

        if let Some(writer) = self.sink.lock().writer.as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
    }
}

impl Drop for EpisodeLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Replace characters that are not allowed in file names.
pub(crate) fn file_safe(name: &str) -> String {
    // "." and ".." would name a directory, not a file
    if name.chars().all(|c| c == '.') {
        return "_".repeat(name.len().max(1));
    }
    name.chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn plain() -> LogConfig {
        LogConfig {
            show_timestamps: false,
            ..LogConfig::default()
        }
    }

    fn read(logger: &EpisodeLogger) -> String {
        logger.flush();
        fs::read_to_string(logger.log_path()).unwrap()
    }

    #[test]
    fn opens_file_named_after_episode() {
        let dir = tempdir().unwrap();
        let logger = EpisodeLogger::new("Show/S01E01", dir.path(), plain()).unwrap();

        assert!(logger.log_path().ends_with("Show_S01E01.log"));
        assert!(logger.log_path().exists());
        assert_eq!(logger.episode(), "Show/S01E01");
    }

    #[test]
    fn file_safe_names() {
        assert_eq!(file_safe("a:b|c"), "a_b_c");
        assert_eq!(file_safe(".."), "__");
        assert_eq!(file_safe(""), "_");
        assert_eq!(file_safe("ep.01"), "ep.01");
    }

    #[test]
    fn writes_report_markers() {
        let dir = tempdir().unwrap();
        let logger = EpisodeLogger::new("s01e01", dir.path(), plain()).unwrap();

        logger.phase("Reference stream");
        logger.warn("low confidence");
        logger.success("jp offset 480ms (high)");

        let content = read(&logger);
        assert!(content.contains("=== Reference stream ==="));
        assert!(content.contains("[WARN] low confidence"));
        assert!(content.contains("[OK] jp offset 480ms (high)"));
    }

    #[test]
    fn drops_lines_below_level() {
        let dir = tempdir().unwrap();
        let logger = EpisodeLogger::new("s01e01", dir.path(), plain()).unwrap();

        logger.debug("hidden");
        logger.info("shown");

        let content = read(&logger);
        assert!(!content.contains("hidden"));
        assert!(content.contains("shown"));
    }

    #[test]
    fn timestamps_prefix_lines() {
        let dir = tempdir().unwrap();
        let logger = EpisodeLogger::new("s01e01", dir.path(), LogConfig::default()).unwrap();

        logger.info("stamped");

        let content = read(&logger);
        let line = content.lines().next().unwrap();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] stamped"));
    }

    #[test]
    fn candidate_table() {
        let dir = tempdir().unwrap();
        let logger = EpisodeLogger::new("s01e01", dir.path(), plain()).unwrap();

        let samples = vec![
            ScoreSample {
                offset_ms: 480,
                score: 0.91,
                overlap_ratio: 0.91,
                boundary_score: None,
                overlap_ms: 9100,
                sub_dur_ms: 10_000,
            },
            ScoreSample {
                offset_ms: 300,
                score: 0.72,
                overlap_ratio: 0.4,
                boundary_score: Some(0.8),
                overlap_ms: 4000,
                sub_dur_ms: 10_000,
            },
        ];
        logger.candidates("jp", &samples);

        let content = read(&logger);
        assert!(content.contains("--- jp candidates ---"));
        assert!(content.contains("#1 offset=480ms score=0.9100 ratio=0.9100\n"));
        assert!(content.contains("#2 offset=300ms score=0.7200 ratio=0.4000 boundary=0.8000"));
    }

    #[test]
    fn json_section() {
        let dir = tempdir().unwrap();
        let logger = EpisodeLogger::new("s01e01", dir.path(), plain()).unwrap();

        logger.json("Result", &serde_json::json!({ "jp": 480 }));

        let content = read(&logger);
        assert!(content.contains("--- Result ---"));
        assert!(content.contains("\"jp\": 480"));
    }

    #[test]
    fn tail_keeps_latest_tool_output() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            error_tail: 5,
            ..plain()
        };
        let logger = EpisodeLogger::new("s01e01", dir.path(), config).unwrap();

        for i in 0..10 {
            logger.tool_output(&format!("silence_end: {}", i));
        }

        let tail = logger.tail();
        assert_eq!(tail.len(), 5);
        assert_eq!(tail.first().map(String::as_str), Some("silence_end: 5"));
        assert_eq!(tail.last().map(String::as_str), Some("silence_end: 9"));

        // Compact: nothing in the file until the tail is dumped
        assert!(!read(&logger).contains("silence_end"));
        logger.dump_tail("ffmpeg");
        let content = read(&logger);
        assert!(content.contains("[ffmpeg/tail]"));
        assert!(content.contains("silence_end: 9"));
        assert!(!content.contains("silence_end: 4"));
    }

    #[test]
    fn verbose_logger_writes_tool_output() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            compact: false,
            ..plain()
        };
        let logger = EpisodeLogger::new("s01e01", dir.path(), config).unwrap();

        logger.tool_output("silence_start: 2.5");
        assert!(read(&logger).contains("silence_start: 2.5"));
    }

    #[test]
    fn close_releases_file() {
        let dir = tempdir().unwrap();
        let logger = EpisodeLogger::new("s01e01", dir.path(), plain()).unwrap();

        logger.info("before");
        logger.close();
        logger.info("after");

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("before"));
        assert!(!content.contains("after"));
    }
}
