use std::path::Path;

use crate::foundation::error::{StoryreelError, StoryreelResult};

#[derive(Clone, Copy, Debug, PartialEq)]
/// Metadata of a narration track.
pub struct AudioMetadata {
    /// Playback duration in seconds.
    pub duration_secs: f64,
    /// Sample rate of the first audio stream, when reported.
    pub sample_rate: Option<u32>,
    /// Channel count of the first audio stream, when reported.
    pub channels: Option<u16>,
}

impl AudioMetadata {
    /// Check that the duration is usable as a timeline length.
    pub fn validate(self) -> StoryreelResult<Self> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(StoryreelError::invalid_audio(format!(
                "duration must be finite and > 0 (got {})",
                self.duration_secs
            )));
        }
        Ok(self)
    }
}

/// Probe narration metadata through `ffprobe`.
pub fn probe_audio(source_path: &Path) -> StoryreelResult<AudioMetadata> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| StoryreelError::invalid_audio(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(StoryreelError::invalid_audio(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_ffprobe_audio(&out.stdout)
}

/// Parse `ffprobe -print_format json -show_streams -show_format` output.
pub(crate) fn parse_ffprobe_audio(json: &[u8]) -> StoryreelResult<AudioMetadata> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        duration: Option<String>,
        sample_rate: Option<String>,
        channels: Option<u16>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| StoryreelError::invalid_audio(format!("ffprobe json parse failed: {e}")))?;
    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .ok_or_else(|| StoryreelError::invalid_audio("no audio stream found"))?;

    // Container duration first; some encoders leave the stream duration unset.
    let duration = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(audio.duration.as_deref())
        .ok_or_else(|| StoryreelError::invalid_audio("ffprobe reported no duration"))?;
    let duration_secs: f64 = duration.trim().parse().map_err(|_| {
        StoryreelError::invalid_audio(format!("unparseable duration '{duration}'"))
    })?;

    AudioMetadata {
        duration_secs,
        sample_rate: audio.sample_rate.as_deref().and_then(|s| s.parse().ok()),
        channels: audio.channels,
    }
    .validate()
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
