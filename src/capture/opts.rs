use std::path::{Path, PathBuf};

use crate::compose::frame::CompositorStyle;
use crate::encode::ffmpeg::Container;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{StoryreelError, StoryreelResult};

/// How playback time advances during capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// Wall-clock playback; capture takes as long as the narration.
    #[default]
    Realtime,
    /// Virtual playback, one frame interval per tick, as fast as encoding allows.
    Offline,
}

/// Capture configuration, fixed for one invocation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptureOpts {
    /// Output surface size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// How playback time advances during capture.
    pub pacing: Pacing,
    /// Container written by the ffmpeg encoder.
    pub container: Container,
    /// Background, caption and CTA card appearance.
    pub style: CompositorStyle,
    /// Font file for captions and the CTA card; without one, no text is drawn.
    pub font: Option<PathBuf>,
}

impl Default for CaptureOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            pacing: Pacing::default(),
            container: Container::default(),
            style: CompositorStyle::default(),
            font: None,
        }
    }
}

impl CaptureOpts {
    /// Load options from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> StoryreelResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read options '{}'", path.display()))?;
        let opts: Self = serde_json::from_str(&text).map_err(|e| {
            StoryreelError::validation(format!("invalid options '{}': {e}", path.display()))
        })?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check canvas, frame rate and caption style.
    pub fn validate(&self) -> StoryreelResult<()> {
        self.canvas.validate()?;
        Fps::new(self.fps.num, self.fps.den)?;
        let c = &self.style.caption;
        if !(c.font_size.is_finite() && c.font_size > 0.0) {
            return Err(StoryreelError::validation(
                "caption font_size must be finite and > 0",
            ));
        }
        if !(c.max_width_ratio > 0.0 && c.max_width_ratio <= 1.0) {
            return Err(StoryreelError::validation(
                "caption max_width_ratio must be in (0, 1]",
            ));
        }
        if c.max_lines == 0 {
            return Err(StoryreelError::validation("caption max_lines must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/opts.rs"]
mod tests;
