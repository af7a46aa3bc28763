//! ASS/SSA subtitle parser.
//!
//! Reads Advanced SubStation Alpha (.ass) and SubStation Alpha (.ssa) files
//! for their timed dialogue only.
//!
//! # Format Overview
//!
//! ASS files have three main sections:
//! - `[Script Info]`: Metadata (title, resolution, etc.)
//! - `[V4+ Styles]` or `[V4 Styles]`: Style definitions
//! - `[Events]`: Dialogue and comment lines
//!
//! Only `Dialogue:` lines inside `[Events]` become cues. All timing is in the
//! format `H:MM:SS.cc` (centiseconds).

use super::srt::clock_to_ms;
use crate::subtitles::clean::{clean_text, is_drawing};
use crate::subtitles::error::ParseError;
use crate::subtitles::types::SubtitleCue;

/// Parse ASS/SSA content into cues.
///
/// Comments, drawings and events that are empty after cleaning are dropped.
pub fn parse_ass(content: &str) -> Result<Vec<SubtitleCue>, ParseError> {
    let mut cues = Vec::new();
    let mut in_events = false;
    let mut event_format: Vec<String> = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1; // 1-indexed for error messages
        let line = line.trim().trim_start_matches('\u{feff}');

        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        // Section header
        if line.starts_with('[') && line.ends_with(']') {
            in_events = line[1..line.len() - 1].eq_ignore_ascii_case("events");
            continue;
        }

        if !in_events {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Format:") {
            event_format = parse_format_fields(rest);
        } else if let Some(rest) = line.strip_prefix("Dialogue:") {
            if let Some(cue) = parse_dialogue(rest, &event_format, line_num)? {
                cues.push(cue);
            }
        }
    }

    Ok(cues)
}

/// Parse the field list of a `Format:` line.
fn parse_format_fields(fields: &str) -> Vec<String> {
    fields.split(',').map(|s| s.trim().to_lowercase()).collect()
}

/// Parse the body of a `Dialogue:` line.
fn parse_dialogue(
    content: &str,
    format: &[String],
    line_num: usize,
) -> Result<Option<SubtitleCue>, ParseError> {
    let default_format;
    let format = if format.is_empty() {
        default_format = default_event_format();
        &default_format
    } else {
        format
    };

    // Text is the last field and may contain commas
    let text_index = format.iter().position(|f| f == "text").unwrap_or(9);
    let parts: Vec<&str> = content.trim().splitn(text_index + 1, ',').collect();

    if parts.len() <= text_index {
        return Err(ParseError::invalid_event(
            line_num,
            format!("Expected at least {} fields", text_index + 1),
        ));
    }

    let field = |name: &str| {
        format
            .iter()
            .position(|f| f == name)
            .and_then(|i| parts.get(i))
            .map(|s| s.trim())
    };

    let start = field("start")
        .ok_or_else(|| ParseError::invalid_event(line_num, "Missing Start field"))?;
    let end = field("end").ok_or_else(|| ParseError::invalid_event(line_num, "Missing End field"))?;

    let start_ms = parse_ass_time(start).ok_or_else(|| ParseError::invalid_time(line_num, start))?;
    let end_ms = parse_ass_time(end).ok_or_else(|| ParseError::invalid_time(line_num, end))?;

    let raw = parts[text_index];
    if is_drawing(raw) {
        return Ok(None);
    }

    let text = clean_text(raw);
    if text.is_empty() || end_ms <= start_ms {
        return Ok(None);
    }

    Ok(Some(SubtitleCue::new(start_ms, end_ms, text)))
}

/// Parse ASS timestamp format: `H:MM:SS.cc`
///
/// Returns time in whole milliseconds.
pub fn parse_ass_time(s: &str) -> Option<i64> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    // Seconds may have centiseconds or milliseconds after decimal
    let (secs, frac) = parts[2].split_once('.').unwrap_or((parts[2], ""));
    clock_to_ms(parts[0], parts[1], secs, frac)
}

/// Event format used when the file has no `Format:` line.
fn default_event_format() -> Vec<String> {
    [
        "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
