//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Deserializer, Serialize};

use crate::confidence::ConfidenceThresholds;
use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Offset search range and resolution.
    #[serde(default)]
    pub search: SearchSettings,

    /// Silence detection and speech-boundary scoring.
    #[serde(default)]
    pub speech: SpeechSettings,

    /// Confidence thresholds per alignment mode.
    #[serde(default)]
    pub confidence: ConfidenceSettings,
}

/// Path configuration for temp files, logs and the offset registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder for temporary files (extracted reference tracks).
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// JSON file storing accepted offsets per episode.
    #[serde(default = "default_registry_path")]
    pub registry_path: String,
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_registry_path() -> String {
    "offsets.json".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
            registry_path: default_registry_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for console and episode logs.
    #[serde(default)]
    pub level: LogLevel,

    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of recent lines to show when an episode fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: default_true(),
            error_tail: default_error_tail(),
        }
    }
}

/// Offset search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Lowest candidate offset in milliseconds.
    #[serde(default = "default_min_offset_ms")]
    pub min_offset_ms: i64,

    /// Highest candidate offset in milliseconds.
    #[serde(default = "default_max_offset_ms")]
    pub max_offset_ms: i64,

    /// Step of the coarse sweep in milliseconds.
    #[serde(default = "default_coarse_step_ms")]
    pub coarse_step_ms: i64,

    /// Step of the fine refinement in milliseconds.
    #[serde(default = "default_fine_step_ms")]
    pub fine_step_ms: i64,

    /// Length of the sampling window from the start of the episode, in seconds.
    #[serde(default = "default_sample_sec")]
    pub sample_sec: f64,
}

fn default_min_offset_ms() -> i64 {
    -20_000
}

fn default_max_offset_ms() -> i64 {
    20_000
}

fn default_coarse_step_ms() -> i64 {
    100
}

fn default_fine_step_ms() -> i64 {
    20
}

fn default_sample_sec() -> f64 {
    600.0
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_offset_ms: default_min_offset_ms(),
            max_offset_ms: default_max_offset_ms(),
            coarse_step_ms: default_coarse_step_ms(),
            fine_step_ms: default_fine_step_ms(),
            sample_sec: default_sample_sec(),
        }
    }
}

/// Silence detection and speech-boundary scoring settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Audio stream selector passed to ffmpeg (`-map 0:<selector>`).
    #[serde(default = "default_audio_stream")]
    pub audio_stream: String,

    /// Noise floor for silence detection in dB.
    #[serde(default = "default_noise_db")]
    pub noise_db: f64,

    /// Minimum silence length in seconds.
    #[serde(default = "default_min_silence_sec")]
    pub min_silence_sec: f64,

    /// Decay scale for boundary closeness in milliseconds.
    #[serde(default = "default_boundary_scale_ms")]
    pub boundary_scale_ms: f64,

    /// Weight of the boundary score in the blended score.
    #[serde(default = "default_boundary_weight")]
    pub boundary_weight: f64,

    /// Weight of the overlap ratio in the blended score.
    #[serde(default = "default_overlap_weight")]
    pub overlap_weight: f64,
}

fn default_audio_stream() -> String {
    "a:0".to_string()
}

fn default_noise_db() -> f64 {
    -35.0
}

fn default_min_silence_sec() -> f64 {
    0.25
}

fn default_boundary_scale_ms() -> f64 {
    320.0
}

fn default_boundary_weight() -> f64 {
    0.85
}

fn default_overlap_weight() -> f64 {
    0.15
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            audio_stream: default_audio_stream(),
            noise_db: default_noise_db(),
            min_silence_sec: default_min_silence_sec(),
            boundary_scale_ms: default_boundary_scale_ms(),
            boundary_weight: default_boundary_weight(),
            overlap_weight: default_overlap_weight(),
        }
    }
}

/// Confidence thresholds, one table per alignment mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSettings {
    /// Thresholds applied to the overlap ratio in reference mode.
    #[serde(
        default = "ConfidenceThresholds::reference",
        deserialize_with = "reference_thresholds"
    )]
    pub reference: ConfidenceThresholds,

    /// Thresholds applied to the boundary score in speech mode.
    #[serde(
        default = "ConfidenceThresholds::speech",
        deserialize_with = "speech_thresholds"
    )]
    pub speech: ConfidenceThresholds,
}

/// A thresholds table where any field may be omitted.
#[derive(Debug, Default, Deserialize)]
struct ThresholdOverrides {
    high_score: Option<f64>,
    high_gap: Option<f64>,
    medium_score: Option<f64>,
    medium_gap: Option<f64>,
}

impl ThresholdOverrides {
    fn apply(self, base: ConfidenceThresholds) -> ConfidenceThresholds {
        ConfidenceThresholds {
            high_score: self.high_score.unwrap_or(base.high_score),
            high_gap: self.high_gap.unwrap_or(base.high_gap),
            medium_score: self.medium_score.unwrap_or(base.medium_score),
            medium_gap: self.medium_gap.unwrap_or(base.medium_gap),
        }
    }
}

fn reference_thresholds<'de, D>(deserializer: D) -> Result<ConfidenceThresholds, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = ThresholdOverrides::deserialize(deserializer)?;
    Ok(overrides.apply(ConfidenceThresholds::reference()))
}

fn speech_thresholds<'de, D>(deserializer: D) -> Result<ConfidenceThresholds, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = ThresholdOverrides::deserialize(deserializer)?;
    Ok(overrides.apply(ConfidenceThresholds::speech()))
}

impl Default for ConfidenceSettings {
    fn default() -> Self {
        Self {
            reference: ConfidenceThresholds::reference(),
            speech: ConfidenceThresholds::speech(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Search,
    Speech,
    Confidence,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Search,
        ConfigSection::Speech,
        ConfigSection::Confidence,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Search => "search",
            ConfigSection::Speech => "speech",
            ConfigSection::Confidence => "confidence",
        }
    }

    /// Comment written above the section.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Working directories and the offset registry",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Search => "Offset search range and resolution",
            ConfigSection::Speech => "Silence detection and speech-boundary scoring",
            ConfigSection::Confidence => "Confidence thresholds (score, gap to runner-up)",
        }
    }
}
