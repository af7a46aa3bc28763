//! Subtitle parsers for the supported formats.
//!
//! Each parser is a pure function that takes content and returns cleaned cues.

mod ass;
mod srt;

pub use ass::{parse_ass, parse_ass_time};
pub use srt::{parse_srt, parse_srt_time};

use crate::subtitles::error::ParseError;
use crate::subtitles::types::{SubtitleCue, SubtitleFormat};

/// Parse subtitle content with auto-detection.
///
/// Detects the format from content if not specified.
pub fn parse_content(
    content: &str,
    format: Option<SubtitleFormat>,
) -> Result<Vec<SubtitleCue>, ParseError> {
    let format = format.unwrap_or_else(|| detect_format(content));

    match format {
        SubtitleFormat::Ass => parse_ass(content),
        SubtitleFormat::Srt => parse_srt(content),
    }
}

/// Detect subtitle format from content.
pub fn detect_format(content: &str) -> SubtitleFormat {
    let content_lower = content.to_lowercase();

    if content_lower.contains("[script info]")
        || content_lower.contains("[v4+ styles]")
        || content_lower.contains("[v4 styles]")
        || content_lower.contains("[events]")
    {
        return SubtitleFormat::Ass;
    }

    SubtitleFormat::Srt
}
