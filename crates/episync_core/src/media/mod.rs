//! Media probing through external tools.
//!
//! The alignment engine never touches audio or video itself. Everything it
//! needs from the container (subtitle stream metadata, an extracted
//! reference track, a silence-detection log and the duration) comes through
//! the [`MediaProbe`] trait. [`FfmpegProbe`] implements it with
//! `ffprobe`/`ffmpeg` subprocesses.

mod ffmpeg;
mod probe;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::SpeechSettings;
use crate::reference::ReferenceStream;

pub use ffmpeg::FfmpegProbe;
pub use probe::parse_streams_json;

/// Errors from external media tools.
#[derive(Error, Debug)]
pub enum MediaError {
    /// Input file does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The tool could not be started (usually not installed or not on PATH).
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited unsuccessfully.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The tool's output could not be understood.
    #[error("Failed to parse {tool} output: {message}")]
    ParseOutput { tool: String, message: String },

    /// Output file missing or empty after extraction.
    #[error("Output file missing or empty: {}", .0.display())]
    OutputMissing(PathBuf),

    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a spawn error.
    pub fn spawn(tool: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            tool: tool.into(),
            source,
        }
    }

    /// Create a parse-output error.
    pub fn parse_output(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseOutput {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Parameters for a silence-detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct SilenceRequest {
    /// Audio stream selector relative to the input (e.g. `a:0`).
    pub audio_stream: String,
    /// Seconds of audio to analyze from the start.
    pub sample_sec: f64,
    /// Noise floor in dB below which audio counts as silence.
    pub noise_db: f64,
    /// Minimum silence length in seconds.
    pub min_silence_sec: f64,
}

impl SilenceRequest {
    /// Build a request from speech settings and a sample length.
    pub fn from_settings(settings: &SpeechSettings, sample_sec: f64) -> Self {
        Self {
            audio_stream: settings.audio_stream.clone(),
            sample_sec,
            noise_db: settings.noise_db,
            min_silence_sec: settings.min_silence_sec,
        }
    }
}

/// Source of container metadata and derived inputs.
pub trait MediaProbe {
    /// List the embedded subtitle streams of a video.
    fn list_subtitle_streams(&self, video: &Path) -> MediaResult<Vec<ReferenceStream>>;

    /// Extract one subtitle stream into `dest_dir`, returning the written file.
    fn extract_subtitle_stream(
        &self,
        video: &Path,
        stream: &ReferenceStream,
        dest_dir: &Path,
    ) -> MediaResult<PathBuf>;

    /// Run silence detection and return the raw log text.
    fn detect_silence(&self, video: &Path, request: &SilenceRequest) -> MediaResult<String>;

    /// Container duration in seconds.
    fn get_duration(&self, video: &Path) -> MediaResult<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_request_from_settings() {
        let settings = SpeechSettings::default();
        let request = SilenceRequest::from_settings(&settings, 300.0);
        assert_eq!(request.audio_stream, "a:0");
        assert_eq!(request.sample_sec, 300.0);
        assert_eq!(request.noise_db, -35.0);
        assert_eq!(request.min_silence_sec, 0.25);
    }

    #[test]
    fn command_failed_display() {
        let err = MediaError::CommandFailed {
            tool: "ffmpeg".to_string(),
            exit_code: 1,
            message: "Invalid data found".to_string(),
        };
        assert_eq!(err.to_string(), "ffmpeg failed with exit code 1: Invalid data found");
    }
}
