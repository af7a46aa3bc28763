//! Core subtitle types.
//!
//! Cue timing is stored as integer milliseconds; parsers round once at
//! parse time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::intervals::Interval;

/// Supported subtitle formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubtitleFormat {
    /// Advanced SubStation Alpha (.ass, .ssa)
    #[default]
    Ass,
    /// SubRip (.srt)
    Srt,
}

impl SubtitleFormat {
    /// Detect format from file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "ass" | "ssa" => Some(Self::Ass),
            "srt" => Some(Self::Srt),
            _ => None,
        }
    }

    /// Format for an ffprobe codec name.
    pub fn from_codec_name(codec: &str) -> Self {
        match codec {
            "ass" | "ssa" => Self::Ass,
            _ => Self::Srt,
        }
    }

    /// Get the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ass => "ass",
            Self::Srt => "srt",
        }
    }
}

/// One timed line of dialogue.
///
/// `text` is cleaned of markup but otherwise opaque to the engine; it is
/// carried through for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Start time in milliseconds.
    pub start_ms: i64,
    /// End time in milliseconds.
    pub end_ms: i64,
    /// Cleaned dialogue text.
    pub text: String,
}

impl SubtitleCue {
    /// Create a new cue.
    pub fn new(start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.end_ms - self.start_ms).max(0)
    }

    /// Timing of this cue as an interval (`None` for zero-length cues).
    pub fn interval(&self) -> Option<Interval> {
        Interval::new(self.start_ms, self.end_ms)
    }
}

/// Timing of every non-empty cue, in cue order.
pub fn cue_intervals(cues: &[SubtitleCue]) -> Vec<Interval> {
    cues.iter().filter_map(SubtitleCue::interval).collect()
}

/// Number of cues starting inside `[0, window_ms)`.
pub fn cues_in_window(cues: &[SubtitleCue], window_ms: i64) -> usize {
    cues.iter()
        .filter(|c| c.start_ms >= 0 && c.start_ms < window_ms && c.end_ms > c.start_ms)
        .count()
}
