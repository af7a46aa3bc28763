//! Episode alignment pipeline.
//!
//! Gathers the inputs for one episode through a [`MediaProbe`], runs the
//! estimator once per subtitle track and returns both results. All fatal
//! conditions are checked before any search starts.
//!
//! # Flow
//!
//! 1. Sampling window: `min(sample_sec, duration)`
//! 2. Parse both subtitle tracks and require cues inside the window
//! 3. Build the basis:
//!    - reference mode: select, extract and parse an embedded stream
//!    - speech mode: run silence detection and take its complement
//! 4. Estimate the offset of each track against the basis

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{Settings, SpeechSettings};
use crate::error::{AlignError, AlignResult};
use crate::estimate::{
    estimate_offset_to_reference, estimate_offset_to_speech, EstimationResult, EstimatorConfig,
};
use crate::intervals::Interval;
use crate::logging::{file_safe, EpisodeLogger};
use crate::media::{MediaProbe, SilenceRequest};
use crate::models::{AlignMode, TrackKind};
use crate::reference::{select_reference_stream, ReferenceStream};
use crate::registry::EpisodeOffsets;
use crate::speech::speech_intervals;
use crate::subtitles::{cue_intervals, cues_in_window, parse_file, SubtitleCue};

/// Inputs for one episode.
#[derive(Debug, Clone)]
pub struct AlignRequest {
    /// Episode name used for logs, temp files and the registry.
    pub episode: String,
    /// Video file carrying the reference stream or the audio.
    pub video: PathBuf,
    /// Japanese subtitle file.
    pub jp: PathBuf,
    /// English subtitle file.
    pub en: PathBuf,
    /// What to align against.
    pub mode: AlignMode,
}

impl AlignRequest {
    fn track_path(&self, track: TrackKind) -> &Path {
        match track {
            TrackKind::Jp => &self.jp,
            TrackKind::En => &self.en,
        }
    }
}

/// Result for one episode.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeAlignment {
    /// Episode name.
    pub episode: String,
    /// Mode used.
    pub mode: AlignMode,
    /// Sampling window in milliseconds.
    pub window_ms: i64,
    /// Stream used as ground truth (reference mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_stream: Option<ReferenceStream>,
    /// Japanese track estimate.
    pub jp: EstimationResult,
    /// English track estimate.
    pub en: EstimationResult,
}

impl EpisodeAlignment {
    /// Estimate for one track.
    pub fn track(&self, track: TrackKind) -> &EstimationResult {
        match track {
            TrackKind::Jp => &self.jp,
            TrackKind::En => &self.en,
        }
    }

    /// Offsets in registry form.
    pub fn offsets(&self) -> EpisodeOffsets {
        EpisodeOffsets {
            jp: self.jp.offset_ms,
            en: self.en.offset_ms,
        }
    }
}

/// Aligns the subtitle tracks of an episode.
pub struct EpisodeAligner<P: MediaProbe> {
    probe: P,
    estimator: EstimatorConfig,
    speech: SpeechSettings,
    sample_sec: f64,
    temp_root: PathBuf,
}

impl<P: MediaProbe> EpisodeAligner<P> {
    /// Create an aligner from settings.
    pub fn new(probe: P, settings: &Settings) -> Self {
        Self {
            probe,
            estimator: EstimatorConfig::from(settings),
            speech: settings.speech.clone(),
            sample_sec: settings.search.sample_sec,
            temp_root: PathBuf::from(&settings.paths.temp_root),
        }
    }

    /// Media probe in use.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Estimator configuration in use.
    pub fn estimator(&self) -> &EstimatorConfig {
        &self.estimator
    }

    /// Align both tracks of one episode.
    ///
    /// Both tracks and the basis are loaded and checked before either
    /// search runs, so a fatal input never produces a half result.
    pub fn align(
        &self,
        request: &AlignRequest,
        logger: Option<&EpisodeLogger>,
    ) -> AlignResult<EpisodeAlignment> {
        tracing::info!(
            "Aligning {} ({} mode) against {}",
            request.episode,
            request.mode,
            request.video.display()
        );

        let window_ms = self.window_ms(&request.video);
        if let Some(l) = logger {
            l.phase("Subtitle tracks");
            l.info(&format!("Window: first {}ms", window_ms));
        }

        let jp = self.load_track(request, TrackKind::Jp, window_ms, logger)?;
        let en = self.load_track(request, TrackKind::En, window_ms, logger)?;

        let (basis, reference_stream) = match request.mode {
            AlignMode::Reference => {
                if let Some(l) = logger {
                    l.phase("Reference stream");
                }
                let (intervals, stream) = self.reference_basis(request, window_ms, logger)?;
                (intervals, Some(stream))
            }
            AlignMode::Speech => {
                if let Some(l) = logger {
                    l.phase("Speech detection");
                }
                (self.speech_basis(request, window_ms, logger)?, None)
            }
        };

        let jp = self.estimate_track(request, TrackKind::Jp, &jp, &basis, window_ms, logger)?;
        let en = self.estimate_track(request, TrackKind::En, &en, &basis, window_ms, logger)?;

        Ok(EpisodeAlignment {
            episode: request.episode.clone(),
            mode: request.mode,
            window_ms,
            reference_stream,
            jp,
            en,
        })
    }

    fn load_track(
        &self,
        request: &AlignRequest,
        track: TrackKind,
        window_ms: i64,
        logger: Option<&EpisodeLogger>,
    ) -> AlignResult<Vec<Interval>> {
        let path = request.track_path(track);
        let cues = parse_file(path)?;
        let in_window = require_cues(&cues, window_ms, &format!("{} track", track))?;

        if let Some(l) = logger {
            l.info(&format!(
                "{}: {} cues, {} in window ({})",
                track,
                cues.len(),
                in_window,
                path.display()
            ));
        }
        Ok(cue_intervals(&cues))
    }

    fn estimate_track(
        &self,
        request: &AlignRequest,
        track: TrackKind,
        subtitle: &[Interval],
        basis: &[Interval],
        window_ms: i64,
        logger: Option<&EpisodeLogger>,
    ) -> AlignResult<EstimationResult> {
        if let Some(l) = logger {
            l.phase(&format!("Estimate {}", track));
        }

        let result = self.estimate(request.mode, subtitle, basis, window_ms)?;

        tracing::info!(
            "{} {}: offset {}ms, score {:.4}, confidence {}",
            request.episode,
            track,
            result.offset_ms,
            result.score,
            result.confidence
        );
        if let Some(l) = logger {
            l.candidates(&track.to_string(), &result.top);
            l.success(&format!(
                "{} offset {}ms ({})",
                track, result.offset_ms, result.confidence
            ));
        }
        Ok(result)
    }

    /// Sampling window in milliseconds, capped by the video duration.
    fn window_ms(&self, video: &Path) -> i64 {
        let seconds = match self.probe.get_duration(video) {
            Ok(duration) => self.sample_sec.min(duration),
            Err(e) => {
                tracing::warn!(
                    "Could not read duration of {}: {}; using {}s",
                    video.display(),
                    e,
                    self.sample_sec
                );
                self.sample_sec
            }
        };
        (seconds * 1000.0).round() as i64
    }

    fn reference_basis(
        &self,
        request: &AlignRequest,
        window_ms: i64,
        logger: Option<&EpisodeLogger>,
    ) -> AlignResult<(Vec<Interval>, ReferenceStream)> {
        let streams = self.probe.list_subtitle_streams(&request.video)?;
        let stream = select_reference_stream(&streams)
            .cloned()
            .ok_or_else(|| AlignError::NoReferenceStream {
                video: request.video.clone(),
            })?;

        if let Some(logger) = logger {
            logger.info(&format!(
                "{} subtitle streams, selected #{} ({}, '{}', {})",
                streams.len(),
                stream.index,
                stream.language,
                stream.title,
                stream.codec_name
            ));
        }

        let dest = self.temp_root.join(file_safe(&request.episode));
        let path = self
            .probe
            .extract_subtitle_stream(&request.video, &stream, &dest)?;

        let cues = parse_file(&path)?;
        let in_window = require_cues(&cues, window_ms, "reference track")?;
        if let Some(logger) = logger {
            logger.info(&format!("Reference: {} cues, {} in window", cues.len(), in_window));
        }

        Ok((cue_intervals(&cues), stream))
    }

    fn speech_basis(
        &self,
        request: &AlignRequest,
        window_ms: i64,
        logger: Option<&EpisodeLogger>,
    ) -> AlignResult<Vec<Interval>> {
        let silence = SilenceRequest::from_settings(&self.speech, window_ms as f64 / 1000.0);
        let log = self.probe.detect_silence(&request.video, &silence)?;

        if let Some(logger) = logger {
            for line in log.lines().filter(|l| l.contains("silencedetect")) {
                logger.tool_output(line);
            }
        }

        let speech = speech_intervals(&log, window_ms);
        if let Some(logger) = logger {
            logger.info(&format!("Speech: {} intervals", speech.len()));
        }
        Ok(speech)
    }

    fn estimate(
        &self,
        mode: AlignMode,
        subtitle: &[Interval],
        basis: &[Interval],
        window_ms: i64,
    ) -> AlignResult<EstimationResult> {
        let config = &self.estimator;
        match mode {
            AlignMode::Reference => estimate_offset_to_reference(
                subtitle,
                basis,
                window_ms,
                config.search,
                config.thresholds(mode),
            ),
            AlignMode::Speech => estimate_offset_to_speech(
                subtitle,
                basis,
                window_ms,
                config.search,
                config.speech,
                config.thresholds(mode),
            ),
        }
    }
}

/// Require at least one cue starting inside the window.
fn require_cues(cues: &[SubtitleCue], window_ms: i64, what: &str) -> AlignResult<usize> {
    match cues_in_window(cues, window_ms) {
        0 => Err(AlignError::empty_window(what, window_ms)),
        n => Ok(n),
    }
}
