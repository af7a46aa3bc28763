//! Speech interval extraction from an FFmpeg `silencedetect` log.
//!
//! The detector prints markers such as:
//! ```text
//! [silencedetect @ 0x55d0] silence_start: 2.5
//! [silencedetect @ 0x55d0] silence_end: 4.0 | silence_duration: 1.5
//! ```
//! Silence spans are paired from these markers, clamped to the sampling
//! window and merged. Speech is everything else inside the window.

use std::sync::LazyLock;

use regex::Regex;

use crate::intervals::{complement, merge, Interval};

// Older ffmpeg builds print `%g`, so tiny values carry an exponent
static SILENCE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"silence_start:\s*(-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)").expect("valid regex")
});

static SILENCE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"silence_end:\s*(-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)").expect("valid regex")
});

/// Parse silence spans from detector output.
///
/// - An end marker with no open start is silence from 0.
/// - A start marker still open at the end of the log closes at `max_ms`.
/// - A second start while one is open is ignored (the silence continues).
///
/// Returns merged silence intervals within `[0, max_ms]`.
pub fn parse_silence_log(log: &str, max_ms: i64) -> Vec<Interval> {
    let mut silences = Vec::new();
    let mut open_start: Option<i64> = None;

    for line in log.lines() {
        if let Some(secs) = capture_secs(&SILENCE_START, line) {
            if open_start.is_none() {
                open_start = Some(secs_to_window_ms(secs, max_ms));
            }
        } else if let Some(secs) = capture_secs(&SILENCE_END, line) {
            let start = open_start.take().unwrap_or(0);
            let end = secs_to_window_ms(secs, max_ms);
            if let Some(interval) = Interval::new(start, end) {
                silences.push(interval);
            }
        }
    }

    if let Some(start) = open_start {
        if let Some(interval) = Interval::new(start, max_ms) {
            silences.push(interval);
        }
    }

    merge(&silences)
}

/// Speech intervals: the complement of merged silence within the window.
pub fn speech_intervals(log: &str, max_ms: i64) -> Vec<Interval> {
    let silences = parse_silence_log(log, max_ms);
    let speech = complement(&silences, max_ms);

    tracing::debug!(
        "Silence log: {} silence spans, {} speech spans in {}ms window",
        silences.len(),
        speech.len(),
        max_ms
    );

    speech
}

fn capture_secs(pattern: &Regex, line: &str) -> Option<f64> {
    pattern
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn secs_to_window_ms(secs: f64, max_ms: i64) -> i64 {
    ((secs * 1000.0).round() as i64).clamp(0, max_ms.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start_ms: i64, end_ms: i64) -> Interval {
        Interval { start_ms, end_ms }
    }

    #[test]
    fn parses_single_silence_pair() {
        let log = "silence_start: 2.5\nsilence_end: 4.0 | silence_duration: 1.5\n";
        assert_eq!(parse_silence_log(log, 10_000), vec![iv(2500, 4000)]);
        assert_eq!(speech_intervals(log, 10_000), vec![iv(0, 2500), iv(4000, 10_000)]);
    }

    #[test]
    fn parses_real_ffmpeg_prefixes() {
        let log = "\
Input #0, matroska,webm, from 'ep01.mkv':
[silencedetect @ 0x5581c0] silence_start: 0.512
[silencedetect @ 0x5581c0] silence_end: 1.2 | silence_duration: 0.688
size=N/A time=00:00:10.00 bitrate=N/A speed= 250x
[silencedetect @ 0x5581c0] silence_start: 6
[silencedetect @ 0x5581c0] silence_end: 7.25 | silence_duration: 1.25
";
        assert_eq!(parse_silence_log(log, 10_000), vec![iv(512, 1200), iv(6000, 7250)]);
    }

    #[test]
    fn end_without_start_is_silence_from_zero() {
        let log = "silence_end: 1.5 | silence_duration: 1.5\n";
        assert_eq!(parse_silence_log(log, 10_000), vec![iv(0, 1500)]);
        assert_eq!(speech_intervals(log, 10_000), vec![iv(1500, 10_000)]);
    }

    #[test]
    fn open_start_closes_at_window_end() {
        let log = "silence_start: 8\n";
        assert_eq!(parse_silence_log(log, 10_000), vec![iv(8000, 10_000)]);
        assert_eq!(speech_intervals(log, 10_000), vec![iv(0, 8000)]);
    }

    #[test]
    fn markers_are_clamped_to_window() {
        let log = "silence_start: -0.02\nsilence_end: 0.3\nsilence_start: 9.5\nsilence_end: 12.0\n";
        assert_eq!(parse_silence_log(log, 10_000), vec![iv(0, 300), iv(9500, 10_000)]);
    }

    #[test]
    fn overlapping_silences_are_merged() {
        let log = "silence_start: 1\nsilence_end: 3\nsilence_end: 2.5\n";
        // The second end has no open start, so it is silence from zero.
        assert_eq!(parse_silence_log(log, 5000), vec![iv(0, 3000)]);
    }

    #[test]
    fn exponent_timestamps_are_parsed() {
        let log = "silence_start: 1.33333e-05\nsilence_end: 2.5 | silence_duration: 2.49999\n\
                   silence_start: 3E+00\nsilence_end: 4\n";
        assert_eq!(parse_silence_log(log, 10_000), vec![iv(0, 2500), iv(3000, 4000)]);
    }

    #[test]
    fn empty_log_is_all_speech() {
        assert!(parse_silence_log("", 5000).is_empty());
        assert_eq!(speech_intervals("", 5000), vec![iv(0, 5000)]);
    }
}
