//! SRT subtitle parser.
//!
//! Parses SubRip (.srt) subtitle files.
//!
//! # Format Overview
//!
//! SRT files consist of sequential entries:
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! Hello, world!
//!
//! 2
//! 00:00:05,000 --> 00:00:08,000
//! This is a test.
//! ```
//!
//! Each entry has:
//! - Index number (optional, ignored)
//! - Timing line: `HH:MM:SS,mmm --> HH:MM:SS,mmm`
//! - One or more lines of text
//! - Blank line separator

use crate::subtitles::clean::clean_text;
use crate::subtitles::error::ParseError;
use crate::subtitles::types::SubtitleCue;

/// Parse SRT content into cues.
///
/// Blocks without a timing line are skipped. A timing line that cannot be
/// parsed is an error.
pub fn parse_srt(content: &str) -> Result<Vec<SubtitleCue>, ParseError> {
    let mut cues = Vec::new();

    // Normalize line endings and BOM, then split into blocks
    let content = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut line_offset = 0;

    for block in content.split("\n\n") {
        let block_lines = block.lines().count().max(1);
        let leading_blank = block.lines().take_while(|l| l.trim().is_empty()).count();
        let lines: Vec<&str> = block.lines().skip(leading_blank).collect();

        let Some((timing_idx, timing_line)) = find_timing_line(&lines) else {
            line_offset += block_lines + 1;
            continue;
        };

        let timing_line_num = line_offset + leading_blank + timing_idx + 1;
        let (start_ms, end_ms) = parse_srt_timing(timing_line)
            .ok_or_else(|| ParseError::invalid_time(timing_line_num, timing_line.trim()))?;

        // Text is everything after the timing line
        let text = clean_text(&lines[timing_idx + 1..].join("\n"));
        if !text.is_empty() && end_ms > start_ms {
            cues.push(SubtitleCue::new(start_ms, end_ms, text));
        }

        line_offset += block_lines + 1;
    }

    Ok(cues)
}

/// Find the timing line in a block of lines.
fn find_timing_line<'a>(lines: &[&'a str]) -> Option<(usize, &'a str)> {
    lines
        .iter()
        .enumerate()
        .find(|(_, line)| line.contains("-->"))
        .map(|(i, line)| (i, *line))
}

/// Parse SRT timing line: `HH:MM:SS,mmm --> HH:MM:SS,mmm`
fn parse_srt_timing(line: &str) -> Option<(i64, i64)> {
    let (start, end) = line.split_once("-->")?;

    // Some writers append position hints after the end time
    let end = end.split_whitespace().next()?;

    Some((parse_srt_time(start.trim())?, parse_srt_time(end)?))
}

/// Parse SRT timestamp: `HH:MM:SS,mmm` or `HH:MM:SS.mmm`
///
/// Returns time in whole milliseconds.
pub fn parse_srt_time(s: &str) -> Option<i64> {
    // Handle both comma and period as decimal separator
    let s = s.trim().replace(',', ".");

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let (secs, frac) = parts[2].split_once('.').unwrap_or((parts[2], ""));
    clock_to_ms(parts[0], parts[1], secs, frac)
}

/// Combine clock fields into milliseconds.
///
/// `None` when a field is not a number or the total overflows.
pub(crate) fn clock_to_ms(hours: &str, minutes: &str, seconds: &str, frac: &str) -> Option<i64> {
    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    let seconds: i64 = seconds.parse().ok()?;
    if hours < 0 || minutes < 0 || seconds < 0 {
        return None;
    }
    let millis = fraction_to_ms(frac)?;

    let whole = hours
        .checked_mul(3_600_000)?
        .checked_add(minutes.checked_mul(60_000)?)?
        .checked_add(seconds.checked_mul(1000)?)?;
    let total = whole as f64 + millis;
    if !total.is_finite() || total >= i64::MAX as f64 {
        return None;
    }
    Some(total.round() as i64)
}

/// Convert the digits after the decimal point to milliseconds.
fn fraction_to_ms(frac: &str) -> Option<f64> {
    if frac.is_empty() {
        return Some(0.0);
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: f64 = frac.parse().ok()?;
    // Normalize based on number of digits
    Some(value * 10f64.powi(3 - frac.len() as i32))
}
