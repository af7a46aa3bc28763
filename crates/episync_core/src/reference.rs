//! Reference stream selection.
//!
//! Picks the embedded subtitle stream most likely to be a complete English
//! dialogue track, which then serves as ground truth for alignment.
//! Signs/songs and forced tracks only cover a fraction of the dialogue and
//! are pushed to the bottom.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Bonus for the preferred language tag.
pub const LANGUAGE_BONUS: i32 = 120;
/// Bonus for the default disposition flag.
pub const DEFAULT_DISPOSITION_BONUS: i32 = 20;
/// Bonus for titles that suggest a full dialogue track.
pub const FULL_TITLE_BONUS: i32 = 30;
/// Penalty for signs/songs/forced titles.
pub const PARTIAL_TITLE_PENALTY: i32 = -140;
/// Bonus for ASS streams.
pub const ASS_CODEC_BONUS: i32 = 5;

/// Language tag preferred for the reference track.
pub const PREFERRED_LANGUAGE: &str = "eng";

static FULL_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)full|dialog|subtitle|subtitles|complete|complet").expect("valid regex")
});

static PARTIAL_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sign|song|forced").expect("valid regex"));

/// Metadata of one embedded subtitle stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceStream {
    /// Absolute stream index in the container.
    pub index: u32,
    /// Codec name as reported by ffprobe (`ass`, `subrip`, ...).
    pub codec_name: String,
    /// Language tag (empty when untagged).
    #[serde(default)]
    pub language: String,
    /// Stream title (empty when untitled).
    #[serde(default)]
    pub title: String,
    /// Whether the stream carries the default disposition.
    #[serde(default)]
    pub disposition_default: bool,
}

/// Score one stream. Higher means more trustworthy as a reference.
pub fn score_stream(stream: &ReferenceStream) -> i32 {
    let mut score = 0;

    if stream.language == PREFERRED_LANGUAGE {
        score += LANGUAGE_BONUS;
    }
    if stream.disposition_default {
        score += DEFAULT_DISPOSITION_BONUS;
    }
    if FULL_TITLE.is_match(&stream.title) {
        score += FULL_TITLE_BONUS;
    }
    if PARTIAL_TITLE.is_match(&stream.title) {
        score += PARTIAL_TITLE_PENALTY;
    }
    if stream.codec_name == "ass" {
        score += ASS_CODEC_BONUS;
    }

    score
}

/// Pick the highest-scoring stream; the first one wins ties.
///
/// Returns `None` for an empty list.
pub fn select_reference_stream(streams: &[ReferenceStream]) -> Option<&ReferenceStream> {
    let mut best: Option<(&ReferenceStream, i32)> = None;

    for stream in streams {
        let score = score_stream(stream);
        tracing::debug!(
            "Subtitle stream #{} [{}] lang='{}' title='{}' default={} -> score {}",
            stream.index,
            stream.codec_name,
            stream.language,
            stream.title,
            stream.disposition_default,
            score
        );

        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((stream, score)),
        }
    }

    best.map(|(stream, _)| stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(index: u32, lang: &str, title: &str, default: bool, codec: &str) -> ReferenceStream {
        ReferenceStream {
            index,
            codec_name: codec.to_string(),
            language: lang.to_string(),
            title: title.to_string(),
            disposition_default: default,
        }
    }

    #[test]
    fn full_dialogue_beats_signs_and_songs() {
        let streams = vec![
            stream(2, "eng", "Full Dialogue", true, "ass"),
            stream(3, "eng", "Signs & Songs", false, "ass"),
        ];
        assert_eq!(score_stream(&streams[0]), 175);
        assert_eq!(score_stream(&streams[1]), -15);
        assert_eq!(select_reference_stream(&streams).unwrap().index, 2);
    }

    #[test]
    fn signs_track_loses_even_when_listed_first() {
        let streams = vec![
            stream(2, "eng", "Signs", true, "ass"),
            stream(3, "eng", "", false, "subrip"),
        ];
        assert_eq!(select_reference_stream(&streams).unwrap().index, 3);
    }

    #[test]
    fn first_stream_wins_ties() {
        let streams = vec![
            stream(4, "jpn", "", false, "subrip"),
            stream(5, "jpn", "", false, "subrip"),
        ];
        assert_eq!(select_reference_stream(&streams).unwrap().index, 4);
    }

    #[test]
    fn title_matching_is_case_insensitive() {
        assert_eq!(score_stream(&stream(0, "", "COMPLETE SUBS", false, "ass")), 35);
        assert_eq!(score_stream(&stream(0, "", "Forced", false, "subrip")), -140);
    }

    #[test]
    fn empty_list_selects_nothing() {
        assert!(select_reference_stream(&[]).is_none());
    }
}
