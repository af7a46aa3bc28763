//! Markup cleaning for cue text.

use std::sync::LazyLock;

use regex::Regex;

static OVERRIDE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}").expect("valid regex"));

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static DRAWING_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\\p[1-9][^}]*\}").expect("valid regex"));

/// Strip formatting from cue text.
///
/// Removes ASS override blocks and HTML-like tags, turns `\N`, `\n` and
/// `\h` into spaces and collapses whitespace.
pub fn clean_text(raw: &str) -> String {
    let text = OVERRIDE_BLOCK.replace_all(raw, "");
    let text = HTML_TAG.replace_all(&text, "");
    let text = text
        .replace("\\N", " ")
        .replace("\\n", " ")
        .replace("\\h", " ");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether an ASS event is a vector drawing rather than dialogue.
pub fn is_drawing(raw: &str) -> bool {
    DRAWING_MODE.is_match(raw)
}
