//! Subtitle stream listing using ffprobe.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

use super::{MediaError, MediaResult};
use crate::reference::ReferenceStream;

/// ffprobe invocation listing the subtitle streams of `path` as JSON.
pub(super) fn stream_list_command(ffprobe: &str, path: &Path) -> Command {
    let mut cmd = Command::new(ffprobe);
    cmd.arg("-v")
        .arg("error")
        .arg("-select_streams")
        .arg("s")
        .arg("-show_entries")
        .arg("stream=index,codec_name:stream_tags=language,title:stream_disposition=default")
        .arg("-of")
        .arg("json")
        .arg(path);
    cmd
}

/// Parse the JSON output of the ffprobe stream listing.
///
/// Streams without an index are skipped. Missing tags become empty strings.
pub fn parse_streams_json(bytes: &[u8]) -> MediaResult<Vec<ReferenceStream>> {
    let json: Value = serde_json::from_slice(bytes)
        .map_err(|e| MediaError::parse_output("ffprobe", e.to_string()))?;

    let streams = json
        .get("streams")
        .and_then(|s| s.as_array())
        .map(|streams| streams.iter().filter_map(parse_stream).collect())
        .unwrap_or_default();

    Ok(streams)
}

/// Parse a single stream entry.
fn parse_stream(stream: &Value) -> Option<ReferenceStream> {
    let index = u32::try_from(stream.get("index")?.as_u64()?).ok()?;

    let codec_name = stream
        .get("codec_name")
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string();

    let tags = stream.get("tags");
    let tag = |key: &str| {
        tags.and_then(|t| t.get(key))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };

    let disposition_default = stream
        .get("disposition")
        .and_then(|d| d.get("default"))
        .and_then(|d| d.as_i64())
        .is_some_and(|d| d != 0);

    Some(ReferenceStream {
        index,
        codec_name,
        language: tag("language"),
        title: tag("title"),
        disposition_default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ffprobe_streams() {
        let json = br#"{
            "programs": [],
            "streams": [
                {
                    "index": 2,
                    "codec_name": "ass",
                    "disposition": { "default": 1, "forced": 0 },
                    "tags": { "language": "eng", "title": "Full Dialogue" }
                },
                {
                    "index": 3,
                    "codec_name": "subrip",
                    "disposition": { "default": 0 }
                }
            ]
        }"#;

        let streams = parse_streams_json(json).unwrap();
        assert_eq!(streams.len(), 2);

        assert_eq!(streams[0].index, 2);
        assert_eq!(streams[0].codec_name, "ass");
        assert_eq!(streams[0].language, "eng");
        assert_eq!(streams[0].title, "Full Dialogue");
        assert!(streams[0].disposition_default);

        assert_eq!(streams[1].index, 3);
        assert_eq!(streams[1].language, "");
        assert_eq!(streams[1].title, "");
        assert!(!streams[1].disposition_default);
    }

    #[test]
    fn no_streams_key_is_empty() {
        assert!(parse_streams_json(b"{}").unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_streams_json(b"not json").unwrap_err();
        assert!(matches!(err, MediaError::ParseOutput { .. }));
    }

    #[test]
    fn stream_list_asks_for_json() {
        let cmd = stream_list_command("ffprobe", Path::new("ep01.mkv"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(cmd.get_program(), "ffprobe");
        assert_eq!(args[..4], ["-v", "error", "-select_streams", "s"]);
        assert!(args.windows(2).any(|w| w == ["-of", "json"]));
        assert_eq!(args.last().map(String::as_str), Some("ep01.mkv"));
    }
}
