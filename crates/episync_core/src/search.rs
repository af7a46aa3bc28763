//! Coarse-to-fine offset search.
//!
//! 1. **Coarse pass**: evaluate every `coarse_step_ms` from `min_offset_ms`
//!    to `max_offset_ms` inclusive and keep the running best.
//! 2. **Fine pass**: re-evaluate `best ± coarse_step_ms` (clamped to the
//!    range) every `fine_step_ms`, replacing the best only on strict
//!    improvement.
//! 3. Rank the fine pool (the coarse pool if the fine pool is empty) by
//!    descending score and report the top candidates.
//!
//! This is local refinement, not a global optimization: a true offset more
//! than one coarse step away from the best coarse bucket is not recovered.
//! The confidence tier exists to flag those results.

use serde::Serialize;

use crate::config::SearchSettings;
use crate::error::{AlignError, AlignResult};
use crate::scoring::{OffsetScorer, ScoreSample};

/// Number of ranked candidates reported with every result.
pub const TOP_CANDIDATES: usize = 5;

/// Offset range and resolutions for the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    /// Lowest offset to try (inclusive).
    pub min_offset_ms: i64,
    /// Highest offset to try (inclusive).
    pub max_offset_ms: i64,
    /// Resolution of the coarse sweep.
    pub coarse_step_ms: i64,
    /// Resolution of the fine refinement.
    pub fine_step_ms: i64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            min_offset_ms: -20_000,
            max_offset_ms: 20_000,
            coarse_step_ms: 100,
            fine_step_ms: 20,
        }
    }
}

impl From<&SearchSettings> for SearchParams {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            min_offset_ms: settings.min_offset_ms,
            max_offset_ms: settings.max_offset_ms,
            coarse_step_ms: settings.coarse_step_ms,
            fine_step_ms: settings.fine_step_ms,
        }
    }
}

impl SearchParams {
    /// Check the range and step sizes.
    pub fn validate(&self) -> AlignResult<()> {
        if self.max_offset_ms <= self.min_offset_ms {
            return Err(AlignError::invalid_search(format!(
                "max offset {}ms must be greater than min offset {}ms",
                self.max_offset_ms, self.min_offset_ms
            )));
        }
        if self.coarse_step_ms <= 0 {
            return Err(AlignError::invalid_search(format!(
                "coarse step must be positive, got {}ms",
                self.coarse_step_ms
            )));
        }
        if self.fine_step_ms <= 0 {
            return Err(AlignError::invalid_search(format!(
                "fine step must be positive, got {}ms",
                self.fine_step_ms
            )));
        }
        Ok(())
    }
}

/// Outcome of one search run.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Best sample found.
    pub best: ScoreSample,
    /// Best candidates by descending score (at most [`TOP_CANDIDATES`]).
    pub top: Vec<ScoreSample>,
    /// Best score minus runner-up score.
    pub score_gap: f64,
    /// Best overlap ratio minus runner-up overlap ratio.
    pub ratio_gap: f64,
    /// Number of coarse evaluations.
    pub coarse_evaluations: usize,
    /// Number of fine evaluations.
    pub fine_evaluations: usize,
}

/// Two-resolution search over an injected scorer.
#[derive(Debug, Clone, Copy)]
pub struct OffsetSearch {
    params: SearchParams,
}

impl OffsetSearch {
    /// Create a search, rejecting empty ranges and non-positive steps.
    pub fn new(params: SearchParams) -> AlignResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Search parameters.
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Run the coarse and fine passes against `scorer`.
    pub fn run(&self, scorer: &dyn OffsetScorer) -> SearchOutcome {
        let p = &self.params;

        // Coarse pass
        let coarse = sweep(scorer, p.min_offset_ms, p.max_offset_ms, p.coarse_step_ms);
        let mut best = first_maximum(&coarse)
            .cloned()
            .unwrap_or_else(|| ScoreSample::degenerate(p.min_offset_ms));

        tracing::debug!(
            "[{}] coarse: {} offsets, best {}ms (score {:.4})",
            scorer.name(),
            coarse.len(),
            best.offset_ms,
            best.score
        );

        // Fine pass around the best coarse bucket
        let fine_from = p.min_offset_ms.max(best.offset_ms - p.coarse_step_ms);
        let fine_to = p.max_offset_ms.min(best.offset_ms + p.coarse_step_ms);
        let fine = sweep(scorer, fine_from, fine_to, p.fine_step_ms);
        for sample in &fine {
            if sample.score > best.score {
                best = sample.clone();
            }
        }

        tracing::debug!(
            "[{}] fine: {} offsets in [{}, {}]ms, best {}ms (score {:.4})",
            scorer.name(),
            fine.len(),
            fine_from,
            fine_to,
            best.offset_ms,
            best.score
        );

        let coarse_evaluations = coarse.len();
        let fine_evaluations = fine.len();

        let pool = if fine.is_empty() { coarse } else { fine };
        let ranked = rank(pool);

        let runner_up = ranked
            .iter()
            .find(|s| s.offset_ms != best.offset_ms)
            .unwrap_or(&best);
        let score_gap = gap(best.score, runner_up.score);
        let ratio_gap = gap(best.overlap_ratio, runner_up.overlap_ratio);

        let top = ranked.into_iter().take(TOP_CANDIDATES).collect();

        SearchOutcome {
            best,
            top,
            score_gap,
            ratio_gap,
            coarse_evaluations,
            fine_evaluations,
        }
    }
}

/// Evaluate `scorer` at every `step` from `from` to `to` inclusive.
fn sweep(scorer: &dyn OffsetScorer, from: i64, to: i64, step: i64) -> Vec<ScoreSample> {
    let mut samples = Vec::new();
    let mut offset = from;
    while offset <= to {
        samples.push(scorer.score(offset));
        offset += step;
    }
    samples
}

/// First sample holding the maximum score (strict `>` keeps the earliest).
fn first_maximum(samples: &[ScoreSample]) -> Option<&ScoreSample> {
    let mut iter = samples.iter();
    let mut best = iter.next()?;
    for sample in iter {
        if sample.score > best.score {
            best = sample;
        }
    }
    Some(best)
}

/// Sort by descending score. Stable, so equal scores keep sweep order.
fn rank(mut pool: Vec<ScoreSample>) -> Vec<ScoreSample> {
    pool.sort_by(|a, b| b.score.total_cmp(&a.score));
    pool
}

/// Difference that never turns into NaN (`-inf - -inf` counts as no gap).
fn gap(best: f64, runner_up: f64) -> f64 {
    let diff = best - runner_up;
    if diff.is_nan() {
        0.0
    } else {
        diff
    }
}
