//! episync core - subtitle offset estimation for episodic video
//!
//! Estimates a constant time offset for a Japanese and an English subtitle
//! track of an episode, either against an embedded reference subtitle
//! stream or against speech detected in the audio. This crate holds all of
//! the logic; the `episync` binary is a thin shell around it.

pub mod aligner;
pub mod confidence;
pub mod config;
pub mod error;
pub mod estimate;
pub mod intervals;
pub mod logging;
pub mod media;
pub mod models;
pub mod reference;
pub mod registry;
pub mod scoring;
pub mod search;
pub mod speech;
pub mod subtitles;

pub use aligner::{AlignRequest, EpisodeAligner, EpisodeAlignment};
pub use confidence::{Confidence, ConfidenceThresholds};
pub use error::{AlignError, AlignResult};
pub use estimate::{
    estimate_offset, estimate_offset_to_reference, estimate_offset_to_speech, EstimationResult,
    EstimatorConfig,
};
pub use intervals::Interval;
pub use models::{AlignMode, TrackKind};
pub use registry::{EpisodeOffsets, OffsetRegistry};
pub use search::SearchParams;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
