//! Reference-overlap scorer.
//!
//! Score = overlapped subtitle time / shifted subtitle time, measured
//! against a trusted reference subtitle track. This is the primary path
//! whenever the episode carries a usable embedded subtitle stream.

use super::{OffsetScorer, ScoreSample};
use crate::intervals::{
    intervals_within, overlap_duration, shift_intervals, total_duration, Interval,
};

/// Scores offsets by overlap with reference subtitle intervals.
#[derive(Debug, Clone)]
pub struct ReferenceOverlapScorer {
    subtitle: Vec<Interval>,
    reference: Vec<Interval>,
    window_ms: i64,
}

impl ReferenceOverlapScorer {
    /// Create a scorer for one subtitle track.
    ///
    /// The reference is normalized to the window once, up front.
    pub fn new(subtitle: &[Interval], reference: &[Interval], window_ms: i64) -> Self {
        Self {
            subtitle: subtitle.to_vec(),
            reference: intervals_within(reference, window_ms),
            window_ms,
        }
    }

    /// Reference intervals after clipping to the window.
    pub fn reference(&self) -> &[Interval] {
        &self.reference
    }
}

impl OffsetScorer for ReferenceOverlapScorer {
    fn name(&self) -> &'static str {
        "reference-overlap"
    }

    fn score(&self, offset_ms: i64) -> ScoreSample {
        let shifted = shift_intervals(&self.subtitle, offset_ms, self.window_ms);
        let sub_dur_ms = total_duration(&shifted);
        if sub_dur_ms == 0 {
            return ScoreSample::degenerate(offset_ms);
        }

        let overlap_ms = overlap_duration(&shifted, &self.reference);
        let overlap_ratio = overlap_ms as f64 / sub_dur_ms as f64;

        ScoreSample {
            offset_ms,
            score: overlap_ratio,
            overlap_ratio,
            boundary_score: None,
            overlap_ms,
            sub_dur_ms,
        }
    }
}
