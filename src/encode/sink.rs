use std::path::PathBuf;

use crate::compose::frame::FrameRGBA;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StoryreelError, StoryreelResult};

/// Configuration handed to a [`FrameSink`] when recording starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Narration muxed next to the video, if any.
    pub audio: Option<AudioInputConfig>,
}

/// Narration track input for sinks that mux audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInputConfig {
    /// Encoded audio file (any format the encoder can demux).
    pub path: PathBuf,
}

/// Sink contract for consuming composed frames in capture order.
///
/// `push_frame` is called with strictly increasing `FrameIndex` values.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StoryreelResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StoryreelResult<()>;
    /// Request stop and wait for the encoder to flush. Calling it again is a no-op.
    fn end(&mut self) -> StoryreelResult<()>;
}

/// Lifecycle of a recording encoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecorderState {
    /// Not started.
    #[default]
    Inactive,
    /// Accepting frames.
    Recording,
    /// Stop acknowledged; remaining output can be drained.
    Stopped,
}

/// A combined audio+video recorder that hands out its output incrementally.
pub trait Encoder: FrameSink {
    /// MIME type of the produced container, e.g. `video/webm;codecs=vp8,opus`.
    fn mime_type(&self) -> &str;

    /// Fail with `EncoderUnavailable` when the host cannot record.
    fn ensure_available(&self) -> StoryreelResult<()>;

    /// Current recorder lifecycle state.
    fn state(&self) -> RecorderState;

    /// Drain the encoded chunks produced since the last call, in output order.
    fn take_chunks(&mut self) -> StoryreelResult<Vec<Vec<u8>>>;

    /// Free every underlying resource. Safe to call in any state, more than once.
    fn release(&mut self);
}

/// Encoder that records frame digests instead of encoding; for tests and debugging.
///
/// Each pushed frame becomes one 16-byte chunk: the frame index and the xxh3 digest of its
/// pixels, both little-endian.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    cfg: Option<SinkConfig>,
    state: RecorderState,
    frames: Vec<(FrameIndex, u64)>,
    pending: Vec<Vec<u8>>,
    released: bool,
    unavailable: bool,
    fail_at: Option<u64>,
    end_calls: usize,
}

impl InMemoryEncoder {
    /// MIME type of the per-frame digest stream.
    pub const MIME_TYPE: &'static str = "application/x-storyreel-frames";

    /// Available encoder that records every frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// An encoder whose availability check always fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// An encoder that errors when frame `idx` is pushed.
    pub fn failing_at(idx: u64) -> Self {
        Self {
            fail_at: Some(idx),
            ..Self::default()
        }
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Recorded frames and their pixel digests, in push order.
    pub fn frames(&self) -> &[(FrameIndex, u64)] {
        &self.frames
    }

    /// `true` once `release` was called.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// How many times `end` was called.
    pub fn end_calls(&self) -> usize {
        self.end_calls
    }
}

impl FrameSink for InMemoryEncoder {
    fn begin(&mut self, cfg: SinkConfig) -> StoryreelResult<()> {
        if self.state() == RecorderState::Recording {
            return Err(StoryreelError::encoder("encoder is already recording"));
        }
        self.cfg = Some(cfg);
        self.frames.clear();
        self.pending.clear();
        self.released = false;
        self.state = RecorderState::Recording;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StoryreelResult<()> {
        if self.state() != RecorderState::Recording {
            return Err(StoryreelError::encoder("encoder is not recording"));
        }
        if self.fail_at == Some(idx.0) {
            return Err(StoryreelError::encoder(format!(
                "injected failure at frame {}",
                idx.0
            )));
        }
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(StoryreelError::encoder("out-of-order frame index"));
        }

        let digest = xxhash_rust::xxh3::xxh3_64(&frame.data);
        let mut chunk = Vec::with_capacity(16);
        chunk.extend_from_slice(&idx.0.to_le_bytes());
        chunk.extend_from_slice(&digest.to_le_bytes());
        self.pending.push(chunk);
        self.frames.push((idx, digest));
        Ok(())
    }

    fn end(&mut self) -> StoryreelResult<()> {
        self.end_calls += 1;
        if self.state() == RecorderState::Recording {
            self.state = RecorderState::Stopped;
        }
        Ok(())
    }
}

impl Encoder for InMemoryEncoder {
    fn mime_type(&self) -> &str {
        Self::MIME_TYPE
    }

    fn ensure_available(&self) -> StoryreelResult<()> {
        if self.unavailable {
            return Err(StoryreelError::encoder_unavailable(
                "in-memory encoder configured as unavailable",
            ));
        }
        Ok(())
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    fn take_chunks(&mut self) -> StoryreelResult<Vec<Vec<u8>>> {
        Ok(std::mem::take(&mut self.pending))
    }

    fn release(&mut self) {
        self.pending.clear();
        self.released = true;
        if self.state() == RecorderState::Recording {
            self.state = RecorderState::Stopped;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
