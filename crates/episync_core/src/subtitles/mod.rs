//! Subtitle loading.
//!
//! Turns SRT and ASS files into timed cues for alignment. Formatting,
//! styles and positioning are discarded; only timing and cleaned text
//! survive.
//!
//! # Usage
//!
//! ```ignore
//! use episync_core::subtitles::{parse_file, cue_intervals};
//!
//! let cues = parse_file("episode01.jp.ass")?;
//! let intervals = cue_intervals(&cues);
//! ```

pub mod clean;
mod error;
pub mod parsers;
mod types;

use std::fs;
use std::path::Path;

pub use error::{ParseError, SubtitleError};
pub use parsers::{
    detect_format, parse_ass, parse_ass_time, parse_content, parse_srt, parse_srt_time,
};
pub use types::{cue_intervals, cues_in_window, SubtitleCue, SubtitleFormat};

/// Parse a subtitle file from disk.
///
/// Detects format from the file extension, falling back to content.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<SubtitleCue>, SubtitleError> {
    let path = path.as_ref();

    // Subtitle files in the wild are not always valid UTF-8
    let bytes = fs::read(path).map_err(|e| SubtitleError::read(path, e))?;
    let content = String::from_utf8_lossy(&bytes);

    let format = SubtitleFormat::from_extension(path);
    let cues =
        parse_content(&content, format).map_err(|e| SubtitleError::parse_file(path, e))?;

    tracing::debug!("Parsed {} cues from {}", cues.len(), path.display());
    Ok(cues)
}
