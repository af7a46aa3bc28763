//! Subtitle loading errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A subtitle file could not be loaded.
#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("Cannot read subtitle file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}': {source}", path.display())]
    ParseFile {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Subtitle text did not follow its format. Lines are 1-based.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed timestamp on line {line}: '{value}'")]
    InvalidTime { line: usize, value: String },

    #[error("Malformed event on line {line}: {message}")]
    InvalidEvent { line: usize, message: String },
}

impl SubtitleError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn parse_file(path: impl Into<PathBuf>, source: ParseError) -> Self {
        Self::ParseFile {
            path: path.into(),
            source,
        }
    }

    /// Parse failure behind this error, with or without file context.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::ParseFile { source, .. } | Self::Parse(source) => Some(source),
            Self::Read { .. } => None,
        }
    }
}

impl ParseError {
    pub fn invalid_time(line: usize, value: impl Into<String>) -> Self {
        Self::InvalidTime {
            line,
            value: value.into(),
        }
    }

    pub fn invalid_event(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            line,
            message: message.into(),
        }
    }
}
