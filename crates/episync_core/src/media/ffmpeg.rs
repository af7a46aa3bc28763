//! FFmpeg-backed media probe.
//!
//! Runs `ffmpeg`/`ffprobe` as subprocesses. Stream extraction writes a
//! subtitle file; silence detection returns ffmpeg's stderr, which is where
//! the `silencedetect` filter reports.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{probe, MediaError, MediaProbe, MediaResult, SilenceRequest};
use crate::reference::ReferenceStream;
use crate::subtitles::SubtitleFormat;

/// Media probe using the ffmpeg command line tools.
#[derive(Debug, Clone)]
pub struct FfmpegProbe {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for FfmpegProbe {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl FfmpegProbe {
    /// Probe using `ffmpeg` and `ffprobe` from PATH.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe using explicit tool paths.
    pub fn with_binaries(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Run a command, failing on a non-zero exit.
    fn run(&self, mut cmd: Command, tool: &str) -> MediaResult<Output> {
        tracing::debug!("Running {}: {:?}", tool, cmd);

        let output = cmd.output().map_err(|e| MediaError::spawn(tool, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::CommandFailed {
                tool: tool.to_string(),
                exit_code: output.status.code().unwrap_or(-1),
                message: last_lines(&stderr, 5),
            });
        }

        Ok(output)
    }
}

impl MediaProbe for FfmpegProbe {
    fn list_subtitle_streams(&self, video: &Path) -> MediaResult<Vec<ReferenceStream>> {
        ensure_exists(video)?;
        tracing::debug!("Probing subtitle streams: {}", video.display());

        let output = self.run(probe::stream_list_command(&self.ffprobe, video), &self.ffprobe)?;
        let streams = probe::parse_streams_json(&output.stdout)?;

        tracing::debug!("Found {} subtitle streams", streams.len());
        Ok(streams)
    }

    fn extract_subtitle_stream(
        &self,
        video: &Path,
        stream: &ReferenceStream,
        dest_dir: &Path,
    ) -> MediaResult<PathBuf> {
        ensure_exists(video)?;
        std::fs::create_dir_all(dest_dir)?;

        let format = SubtitleFormat::from_codec_name(&stream.codec_name);
        let dest = dest_dir.join(format!("ref_{}.{}", stream.index, format.extension()));

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-y")
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(video)
            .arg("-map")
            .arg(format!("0:{}", stream.index))
            .arg(&dest);

        self.run(cmd, &self.ffmpeg)?;

        let written = std::fs::metadata(&dest).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(MediaError::OutputMissing(dest));
        }

        tracing::debug!(
            "Extracted stream {} ({}) to {}",
            stream.index,
            stream.codec_name,
            dest.display()
        );
        Ok(dest)
    }

    fn detect_silence(&self, video: &Path, request: &SilenceRequest) -> MediaResult<String> {
        ensure_exists(video)?;

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-hide_banner")
            .arg("-nostats")
            .arg("-t")
            .arg(format!("{:.3}", request.sample_sec))
            .arg("-i")
            .arg(video)
            .arg("-map")
            .arg(format!("0:{}", request.audio_stream))
            .arg("-af")
            .arg(silence_filter(request.noise_db, request.min_silence_sec))
            .arg("-f")
            .arg("null")
            .arg("-");

        let output = self.run(cmd, &self.ffmpeg)?;
        let log = String::from_utf8_lossy(&output.stderr).into_owned();

        tracing::debug!(
            "Silence detection on {} ({}s of {}): {} log lines",
            video.display(),
            request.sample_sec,
            request.audio_stream,
            log.lines().count()
        );
        Ok(log)
    }

    fn get_duration(&self, video: &Path) -> MediaResult<f64> {
        ensure_exists(video)?;

        let mut cmd = Command::new(&self.ffprobe);
        cmd.arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(video);

        let output = self.run(cmd, &self.ffprobe)?;
        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}

/// The `silencedetect` filter expression.
fn silence_filter(noise_db: f64, min_silence_sec: f64) -> String {
    format!("silencedetect=noise={}dB:d={}", noise_db, min_silence_sec)
}

/// Parse ffprobe's bare duration output.
fn parse_duration(stdout: &str) -> MediaResult<f64> {
    let value = stdout.trim();
    let duration: f64 = value
        .parse()
        .map_err(|e| MediaError::parse_output("ffprobe", format!("duration '{}': {}", value, e)))?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(MediaError::parse_output(
            "ffprobe",
            format!("duration out of range: {}", duration),
        ));
    }
    Ok(duration)
}

fn ensure_exists(path: &Path) -> MediaResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(MediaError::SourceNotFound(path.to_path_buf()))
    }
}

/// Last `n` non-empty lines of tool output.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
