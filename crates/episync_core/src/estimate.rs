//! Offset estimation for one subtitle track.
//!
//! Wires a scorer into the coarse-to-fine search and classifies the result.
//! Each call is independent: nothing is shared between tracks or calls.

use serde::Serialize;

use crate::confidence::{Confidence, ConfidenceThresholds};
use crate::config::Settings;
use crate::error::{AlignError, AlignResult};
use crate::intervals::{intervals_within, Interval};
use crate::models::AlignMode;
use crate::scoring::{
    OffsetScorer, ReferenceOverlapScorer, ScoreSample, SpeechBoundaryScorer, SpeechScoringConfig,
};
use crate::search::{OffsetSearch, SearchParams};

/// Estimated offset for one track.
#[derive(Debug, Clone, Serialize)]
pub struct EstimationResult {
    /// Offset to add to every cue, in milliseconds.
    pub offset_ms: i64,
    /// Score of the best candidate.
    pub score: f64,
    /// Overlap ratio of the best candidate.
    pub overlap_ratio: f64,
    /// Boundary score of the best candidate (speech mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary_score: Option<f64>,
    /// Trust tier of the estimate.
    pub confidence: Confidence,
    /// Best score minus runner-up score.
    pub score_gap: f64,
    /// Best overlap ratio minus runner-up overlap ratio.
    pub ratio_gap: f64,
    /// Top candidates by descending score.
    pub top: Vec<ScoreSample>,
}

/// Everything the estimator needs besides the intervals themselves.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Offset range and resolution.
    pub search: SearchParams,
    /// Speech-boundary blend.
    pub speech: SpeechScoringConfig,
    /// Thresholds for reference mode.
    pub reference_thresholds: ConfidenceThresholds,
    /// Thresholds for speech mode.
    pub speech_thresholds: ConfidenceThresholds,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            search: SearchParams::default(),
            speech: SpeechScoringConfig::default(),
            reference_thresholds: ConfidenceThresholds::reference(),
            speech_thresholds: ConfidenceThresholds::speech(),
        }
    }
}

impl From<&Settings> for EstimatorConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            search: SearchParams::from(&settings.search),
            speech: SpeechScoringConfig::from(&settings.speech),
            reference_thresholds: settings.confidence.reference,
            speech_thresholds: settings.confidence.speech,
        }
    }
}

impl EstimatorConfig {
    /// Thresholds for a mode.
    pub fn thresholds(&self, mode: AlignMode) -> &ConfidenceThresholds {
        match mode {
            AlignMode::Reference => &self.reference_thresholds,
            AlignMode::Speech => &self.speech_thresholds,
        }
    }
}

/// Search with any scorer and classify the best candidate.
///
/// In reference mode the confidence metric is the overlap ratio; in speech
/// mode it is the boundary score. A degenerate best candidate is always
/// `low`.
pub fn estimate_offset(
    scorer: &dyn OffsetScorer,
    params: SearchParams,
    mode: AlignMode,
    thresholds: &ConfidenceThresholds,
) -> AlignResult<EstimationResult> {
    let outcome = OffsetSearch::new(params)?.run(scorer);
    let best = &outcome.best;

    let metric = match mode {
        AlignMode::Reference => Some(best.overlap_ratio),
        AlignMode::Speech => best.boundary_score,
    };
    let confidence = match metric {
        Some(metric) if !best.is_degenerate() => thresholds.classify(metric, outcome.ratio_gap),
        _ => Confidence::Low,
    };

    tracing::debug!(
        "[{}] {} coarse + {} fine evaluations",
        scorer.name(),
        outcome.coarse_evaluations,
        outcome.fine_evaluations
    );
    if confidence == Confidence::Low {
        tracing::warn!(
            "[{}] low confidence: offset {}ms, score {:.4}, ratio gap {:.4}",
            scorer.name(),
            best.offset_ms,
            best.score,
            outcome.ratio_gap
        );
    }

    Ok(EstimationResult {
        offset_ms: best.offset_ms,
        score: best.score,
        overlap_ratio: best.overlap_ratio,
        boundary_score: best.boundary_score,
        confidence,
        score_gap: outcome.score_gap,
        ratio_gap: outcome.ratio_gap,
        top: outcome.top,
    })
}

/// Estimate a track's offset against reference subtitle intervals.
///
/// Fails if the reference has nothing inside the window. An empty subtitle
/// set is not an error; it yields a `low` result.
pub fn estimate_offset_to_reference(
    subtitle: &[Interval],
    reference: &[Interval],
    window_ms: i64,
    params: SearchParams,
    thresholds: &ConfidenceThresholds,
) -> AlignResult<EstimationResult> {
    if intervals_within(reference, window_ms).is_empty() {
        return Err(AlignError::empty_window("reference track", window_ms));
    }

    let scorer = ReferenceOverlapScorer::new(subtitle, reference, window_ms);
    estimate_offset(&scorer, params, AlignMode::Reference, thresholds)
}

/// Estimate a track's offset against detected speech intervals.
///
/// Fails if there is no speech inside the window.
pub fn estimate_offset_to_speech(
    subtitle: &[Interval],
    speech: &[Interval],
    window_ms: i64,
    params: SearchParams,
    config: SpeechScoringConfig,
    thresholds: &ConfidenceThresholds,
) -> AlignResult<EstimationResult> {
    if intervals_within(speech, window_ms).is_empty() {
        return Err(AlignError::empty_window("speech", window_ms));
    }

    let scorer = SpeechBoundaryScorer::new(subtitle, speech, window_ms, config);
    estimate_offset(&scorer, params, AlignMode::Speech, thresholds)
}
