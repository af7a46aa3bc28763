//! Offset scoring strategies.
//!
//! A scorer answers one question: how well does the subtitle track line up
//! with its reference basis when shifted by `offset_ms`? The search in
//! [`crate::search`] only sees the [`OffsetScorer`] trait, so new strategies
//! plug in without touching the search algorithm.
//!
//! # Available Strategies
//!
//! - **ReferenceOverlap**: fraction of subtitle time covered by a trusted
//!   reference subtitle track.
//! - **SpeechBoundary**: closeness of cue starts/ends to speech onsets and
//!   offsets, blended with speech overlap.

mod reference_overlap;
mod speech_boundary;

pub use reference_overlap::ReferenceOverlapScorer;
pub use speech_boundary::{SpeechBoundaryScorer, SpeechScoringConfig};

use serde::Serialize;

/// One evaluation of a scorer at one offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSample {
    /// Candidate offset in milliseconds.
    pub offset_ms: i64,
    /// Strategy score (higher is better). `-inf` for a degenerate sample.
    pub score: f64,
    /// Overlapped fraction of the shifted subtitle duration (0.0 - 1.0).
    pub overlap_ratio: f64,
    /// Boundary alignment score (speech strategy only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary_score: Option<f64>,
    /// Overlapped time in milliseconds.
    pub overlap_ms: i64,
    /// Shifted subtitle duration inside the window, in milliseconds.
    pub sub_dur_ms: i64,
}

impl ScoreSample {
    /// Sample for an offset where no subtitle time is left in the window.
    ///
    /// Not an error: the low score demotes the offset and the search goes on.
    pub fn degenerate(offset_ms: i64) -> Self {
        Self {
            offset_ms,
            score: f64::NEG_INFINITY,
            overlap_ratio: 0.0,
            boundary_score: None,
            overlap_ms: 0,
            sub_dur_ms: 0,
        }
    }

    /// Whether this sample came from an empty shifted subtitle set.
    pub fn is_degenerate(&self) -> bool {
        self.sub_dur_ms == 0
    }
}

/// Trait for offset scoring strategies.
///
/// Implementations must be deterministic: the same offset always yields the
/// same sample.
pub trait OffsetScorer: Send + Sync {
    /// Get the name of this strategy.
    fn name(&self) -> &'static str;

    /// Score the subtitle track shifted by `offset_ms`.
    fn score(&self, offset_ms: i64) -> ScoreSample;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_sample_scores_negative_infinity() {
        let sample = ScoreSample::degenerate(-200);
        assert_eq!(sample.offset_ms, -200);
        assert!(sample.score.is_infinite() && sample.score < 0.0);
        assert_eq!(sample.overlap_ratio, 0.0);
        assert!(sample.is_degenerate());
    }
}
