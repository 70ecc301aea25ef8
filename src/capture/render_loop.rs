use std::sync::Arc;

use crate::assets::store::PreparedImage;
use crate::compose::frame::{FrameCompositor, FrameRGBA};
use crate::foundation::error::{StoryreelError, StoryreelResult};
use crate::storyboard::model::SceneSegment;
use crate::timeline::allocate::Timeline;

/// Counters kept by [`RenderLoop`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderLoopStats {
    /// Calls to `tick`.
    pub ticks: u64,
    /// Frames actually composed.
    pub compositions: u64,
}

/// Maps playback time to a composed frame.
///
/// A frame is composed only when the active segment changes; ticks within one segment reuse it.
pub struct RenderLoop<'a> {
    segments: &'a [SceneSegment],
    images: &'a [Option<Arc<PreparedImage>>],
    timeline: &'a Timeline,
    compositor: &'a mut FrameCompositor,
    current: Option<(usize, FrameRGBA)>,
    stats: RenderLoopStats,
}

impl<'a> RenderLoop<'a> {
    /// Bind a compositor to one storyboard snapshot and its timeline.
    pub fn new(
        segments: &'a [SceneSegment],
        images: &'a [Option<Arc<PreparedImage>>],
        timeline: &'a Timeline,
        compositor: &'a mut FrameCompositor,
    ) -> StoryreelResult<Self> {
        if segments.is_empty() {
            return Err(StoryreelError::EmptyStoryboard);
        }
        if images.len() != segments.len() || timeline.len() != segments.len() {
            return Err(StoryreelError::validation(format!(
                "render loop inputs disagree: {} segments, {} images, {} cue points",
                segments.len(),
                images.len(),
                timeline.len()
            )));
        }
        Ok(Self {
            segments,
            images,
            timeline,
            compositor,
            current: None,
            stats: RenderLoopStats::default(),
        })
    }

    /// Frame for playback position `t`, plus the active segment index.
    pub fn tick(&mut self, t: f64) -> StoryreelResult<(usize, &FrameRGBA)> {
        self.stats.ticks += 1;
        let idx = self.timeline.locate(t);

        let stale = self.current.as_ref().is_none_or(|(i, _)| *i != idx);
        if stale {
            let seg = &self.segments[idx];
            let frame =
                self.compositor
                    .compose(self.images[idx].as_deref(), &seg.caption, seg.is_cta)?;
            self.stats.compositions += 1;
            tracing::debug!(segment = idx, t, "active segment changed");
            self.current = Some((idx, frame));
        }

        match self.current.as_ref() {
            Some((i, frame)) => Ok((*i, frame)),
            None => Err(StoryreelError::validation("render loop has no current frame")),
        }
    }

    /// The most recently composed frame.
    pub fn current_frame(&self) -> Option<&FrameRGBA> {
        self.current.as_ref().map(|(_, f)| f)
    }

    /// Counters since construction.
    pub fn stats(&self) -> RenderLoopStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/render_loop.rs"]
mod tests;
