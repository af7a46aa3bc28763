//! Speech-boundary scorer.
//!
//! In continuous dialogue nearly every offset overlaps speech, so the
//! overlap ratio is flat over a wide range. Whether cue starts and ends land
//! on speech onsets and offsets is far more offset-sensitive, so this scorer
//! weights boundary closeness heavily and keeps overlap as a tie-breaker.

use super::{OffsetScorer, ScoreSample};
use crate::config::SpeechSettings;
use crate::intervals::{
    boundary_closeness, ends, intervals_within, overlap_duration, shift_intervals, starts,
    total_duration, Interval,
};

/// Tunables for the speech-boundary blend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechScoringConfig {
    /// Decay scale for boundary closeness, in milliseconds.
    pub boundary_scale_ms: f64,
    /// Weight of the boundary score in the final score.
    pub boundary_weight: f64,
    /// Weight of the overlap ratio in the final score.
    pub overlap_weight: f64,
}

impl Default for SpeechScoringConfig {
    fn default() -> Self {
        Self {
            boundary_scale_ms: 320.0,
            boundary_weight: 0.85,
            overlap_weight: 0.15,
        }
    }
}

impl From<&SpeechSettings> for SpeechScoringConfig {
    fn from(settings: &SpeechSettings) -> Self {
        Self {
            boundary_scale_ms: settings.boundary_scale_ms,
            boundary_weight: settings.boundary_weight,
            overlap_weight: settings.overlap_weight,
        }
    }
}

/// Scores offsets by alignment of cue boundaries with speech boundaries.
#[derive(Debug, Clone)]
pub struct SpeechBoundaryScorer {
    subtitle: Vec<Interval>,
    speech: Vec<Interval>,
    speech_starts: Vec<i64>,
    speech_ends: Vec<i64>,
    window_ms: i64,
    config: SpeechScoringConfig,
}

impl SpeechBoundaryScorer {
    /// Create a scorer for one subtitle track.
    pub fn new(
        subtitle: &[Interval],
        speech: &[Interval],
        window_ms: i64,
        config: SpeechScoringConfig,
    ) -> Self {
        let speech = intervals_within(speech, window_ms);
        // Normalized, so both lists are already ascending
        let speech_starts = starts(&speech);
        let speech_ends = ends(&speech);

        Self {
            subtitle: subtitle.to_vec(),
            speech,
            speech_starts,
            speech_ends,
            window_ms,
            config,
        }
    }

    /// Speech intervals after clipping to the window.
    pub fn speech(&self) -> &[Interval] {
        &self.speech
    }
}

impl OffsetScorer for SpeechBoundaryScorer {
    fn name(&self) -> &'static str {
        "speech-boundary"
    }

    fn score(&self, offset_ms: i64) -> ScoreSample {
        let shifted = shift_intervals(&self.subtitle, offset_ms, self.window_ms);
        let sub_dur_ms = total_duration(&shifted);
        if sub_dur_ms == 0 {
            return ScoreSample::degenerate(offset_ms);
        }

        let overlap_ms = overlap_duration(&shifted, &self.speech);
        let overlap_ratio = overlap_ms as f64 / sub_dur_ms as f64;

        let scale = self.config.boundary_scale_ms;
        let start_closeness = boundary_closeness(&starts(&shifted), &self.speech_starts, scale);
        let end_closeness = boundary_closeness(&ends(&shifted), &self.speech_ends, scale);
        let boundary_score = (start_closeness + end_closeness) / 2.0;

        let score = boundary_score * self.config.boundary_weight
            + overlap_ratio * self.config.overlap_weight;

        ScoreSample {
            offset_ms,
            score,
            overlap_ratio,
            boundary_score: Some(boundary_score),
            overlap_ms,
            sub_dur_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start_ms: i64, end_ms: i64) -> Interval {
        Interval { start_ms, end_ms }
    }

    #[test]
    fn aligned_boundaries_score_one() {
        let speech = [iv(1000, 2000), iv(3000, 4500)];
        let subtitle = [iv(700, 1700), iv(2700, 4200)];
        let scorer =
            SpeechBoundaryScorer::new(&subtitle, &speech, 10_000, SpeechScoringConfig::default());

        let sample = scorer.score(300);
        assert_eq!(sample.boundary_score, Some(1.0));
        assert_eq!(sample.overlap_ratio, 1.0);
        assert!((sample.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn boundary_score_discriminates_when_overlap_is_flat() {
        // One long speech run: every small shift overlaps fully
        let speech = [iv(0, 2000), iv(2100, 9000)];
        let subtitle = [iv(100, 2100)];
        let scorer =
            SpeechBoundaryScorer::new(&subtitle, &speech, 10_000, SpeechScoringConfig::default());

        let aligned = scorer.score(-100);
        let off = scorer.score(-400);
        assert!(aligned.boundary_score.unwrap() > off.boundary_score.unwrap());
        assert!(aligned.score > off.score);
    }

    #[test]
    fn score_blends_boundary_and_overlap() {
        let speech = [iv(1000, 2000)];
        let subtitle = [iv(1320, 2320)];
        let scorer =
            SpeechBoundaryScorer::new(&subtitle, &speech, 10_000, SpeechScoringConfig::default());

        let sample = scorer.score(0);
        let expected_boundary = (-1.0_f64).exp();
        assert!((sample.boundary_score.unwrap() - expected_boundary).abs() < 1e-9);
        assert!((sample.overlap_ratio - 0.68).abs() < 1e-12);
        let expected = expected_boundary * 0.85 + 0.68 * 0.15;
        assert!((sample.score - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_subtitle_is_degenerate() {
        let scorer =
            SpeechBoundaryScorer::new(&[], &[iv(0, 1000)], 10_000, SpeechScoringConfig::default());
        let sample = scorer.score(0);
        assert_eq!(sample.score, f64::NEG_INFINITY);
        assert!(sample.boundary_score.is_none());
    }

    #[test]
    fn config_comes_from_settings() {
        let settings = SpeechSettings {
            boundary_scale_ms: 250.0,
            ..SpeechSettings::default()
        };
        let config = SpeechScoringConfig::from(&settings);
        assert_eq!(config.boundary_scale_ms, 250.0);
        assert_eq!(config.boundary_weight, 0.85);
    }
}
