//! Core enums used throughout the application.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the subtitle tracks are aligned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignMode {
    /// An embedded subtitle stream selected as ground truth.
    #[default]
    Reference,
    /// Speech intervals from silence detection.
    Speech,
}

impl std::fmt::Display for AlignMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignMode::Reference => write!(f, "reference"),
            AlignMode::Speech => write!(f, "speech"),
        }
    }
}

impl FromStr for AlignMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "ref" => Ok(AlignMode::Reference),
            "speech" => Ok(AlignMode::Speech),
            other => Err(format!("unknown alignment mode '{}'", other)),
        }
    }
}

/// Which of the two subtitle tracks of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Japanese track.
    Jp,
    /// English track.
    En,
}

impl TrackKind {
    /// Both tracks in processing order.
    pub const ALL: [TrackKind; 2] = [TrackKind::Jp, TrackKind::En];
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKind::Jp => write!(f, "jp"),
            TrackKind::En => write!(f, "en"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_mode_parses() {
        assert_eq!("Reference".parse::<AlignMode>(), Ok(AlignMode::Reference));
        assert_eq!("speech".parse::<AlignMode>(), Ok(AlignMode::Speech));
        assert!("audio".parse::<AlignMode>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AlignMode::Speech).unwrap(), "\"speech\"");
        assert_eq!(serde_json::to_string(&TrackKind::Jp).unwrap(), "\"jp\"");
        assert_eq!(TrackKind::En.to_string(), "en");
    }
}
