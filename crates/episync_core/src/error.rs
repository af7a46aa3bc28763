//! Error types for offset estimation.
//!
//! Only whole-track conditions are fatal. A single degenerate offset is
//! scored `-inf` and never surfaces here.

use std::path::PathBuf;

use thiserror::Error;

use crate::media::MediaError;
use crate::registry::RegistryError;
use crate::subtitles::{ParseError, SubtitleError};

/// Fatal alignment error.
#[derive(Error, Debug)]
pub enum AlignError {
    /// The video has no embedded subtitle stream to use as ground truth.
    #[error("No reference subtitle stream found in '{}'", video.display())]
    NoReferenceStream { video: PathBuf },

    /// A track or basis has nothing inside the sampling window.
    #[error("Zero lines in sample window: {what} is empty within the first {window_ms}ms")]
    EmptyAlignmentWindow { what: String, window_ms: i64 },

    /// A cue timestamp could not be parsed.
    #[error("Malformed timestamp at line {line}: '{value}'")]
    MalformedTimestamp { line: usize, value: String },

    /// Offset range or step sizes are unusable.
    #[error("Invalid search parameters: {0}")]
    InvalidSearchParams(String),

    /// Subtitle file could not be read or parsed.
    #[error(transparent)]
    Subtitle(SubtitleError),

    /// An external media tool failed.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// The offset registry could not be read or written.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl AlignError {
    /// Create an empty-window error.
    pub fn empty_window(what: impl Into<String>, window_ms: i64) -> Self {
        Self::EmptyAlignmentWindow {
            what: what.into(),
            window_ms,
        }
    }

    /// Create an invalid search parameters error.
    pub fn invalid_search(message: impl Into<String>) -> Self {
        Self::InvalidSearchParams(message.into())
    }
}

impl From<ParseError> for AlignError {
    fn from(err: ParseError) -> Self {
        SubtitleError::Parse(err).into()
    }
}

impl From<SubtitleError> for AlignError {
    fn from(err: SubtitleError) -> Self {
        match err {
            SubtitleError::Parse(ParseError::InvalidTime { line, value })
            | SubtitleError::ParseFile {
                source: ParseError::InvalidTime { line, value },
                ..
            } => Self::MalformedTimestamp { line, value },
            other => Self::Subtitle(other),
        }
    }
}

/// Result type for alignment operations.
pub type AlignResult<T> = Result<T, AlignError>;
