//! Confidence tiers for estimated offsets.
//!
//! A tier combines how good the best candidate is (overlap ratio in
//! reference mode, boundary score in speech mode) with how clearly it beats
//! the runner-up. The thresholds are empirical and live in configuration.

use serde::{Deserialize, Serialize};

/// How much an estimated offset can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Score and gap thresholds for one alignment mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    /// Minimum quality metric for `high`.
    pub high_score: f64,
    /// Minimum ratio gap for `high`.
    pub high_gap: f64,
    /// Minimum quality metric for `medium`.
    pub medium_score: f64,
    /// Minimum ratio gap for `medium`.
    pub medium_gap: f64,
}

impl ConfidenceThresholds {
    /// Defaults for reference-overlap mode (metric: overlap ratio).
    pub const fn reference() -> Self {
        Self {
            high_score: 0.70,
            high_gap: 0.01,
            medium_score: 0.55,
            medium_gap: 0.006,
        }
    }

    /// Defaults for speech-boundary mode (metric: boundary score).
    pub const fn speech() -> Self {
        Self {
            high_score: 0.55,
            high_gap: 0.01,
            medium_score: 0.45,
            medium_gap: 0.006,
        }
    }

    /// Classify a quality metric and ratio gap.
    pub fn classify(&self, metric: f64, ratio_gap: f64) -> Confidence {
        if metric >= self.high_score && ratio_gap >= self.high_gap {
            Confidence::High
        } else if metric >= self.medium_score && ratio_gap >= self.medium_gap {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}
