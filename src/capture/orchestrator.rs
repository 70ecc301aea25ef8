use std::path::{Path, PathBuf};

use crate::assets::media::{AudioMetadata, probe_audio};
use crate::assets::store::resolve_images;
use crate::capture::artifact::EncodedArtifact;
use crate::capture::clock::{OfflineClock, PlaybackClock, RealtimeClock};
use crate::capture::opts::{CaptureOpts, Pacing};
use crate::capture::render_loop::RenderLoop;
use crate::capture::state::{CaptureEvent, CapturePhase};
use crate::compose::frame::FrameCompositor;
use crate::compose::text::CaptionFont;
use crate::encode::sink::{AudioInputConfig, Encoder, RecorderState, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StoryreelError, StoryreelResult};
use crate::storyboard::model::SceneSegment;
use crate::timeline::allocate::allocate;

/// Slack added before flooring playback time to a frame index, so that a position landing on a
/// frame boundary is not rounded down by float error.
const FRAME_EPSILON_SECS: f64 = 1e-6;

/// The narration track driving a capture.
pub trait NarrationSource {
    /// Human-readable name for logs and errors.
    fn describe(&self) -> String;

    /// Read track metadata. Fails with `InvalidAudio` when the track is unusable.
    fn load_metadata(&self) -> StoryreelResult<AudioMetadata>;

    /// The audio input handed to the encoder, or `None` for a silent capture.
    fn encoder_input(&self) -> Option<AudioInputConfig>;
}

/// Narration stored in an audio file, probed with `ffprobe`.
#[derive(Clone, Debug)]
pub struct NarrationFile {
    path: PathBuf,
}

impl NarrationFile {
    /// Narration read from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the narration file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NarrationSource for NarrationFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_metadata(&self) -> StoryreelResult<AudioMetadata> {
        if !self.path.is_file() {
            return Err(StoryreelError::invalid_audio(format!(
                "narration file '{}' does not exist",
                self.path.display()
            )));
        }
        probe_audio(&self.path)
    }

    fn encoder_input(&self) -> Option<AudioInputConfig> {
        Some(AudioInputConfig {
            path: self.path.clone(),
        })
    }
}

/// A track of known length with no audio stream; for dry runs and tests.
#[derive(Clone, Copy, Debug)]
pub struct SilentNarration {
    /// Track length in seconds.
    pub duration_secs: f64,
}

impl SilentNarration {
    /// Silence lasting `duration_secs`.
    pub fn new(duration_secs: f64) -> Self {
        Self { duration_secs }
    }
}

impl NarrationSource for SilentNarration {
    fn describe(&self) -> String {
        format!("silence ({}s)", self.duration_secs)
    }

    fn load_metadata(&self) -> StoryreelResult<AudioMetadata> {
        AudioMetadata {
            duration_secs: self.duration_secs,
            sample_rate: None,
            channels: None,
        }
        .validate()
    }

    fn encoder_input(&self) -> Option<AudioInputConfig> {
        None
    }
}

/// One preview request: a narration track and the storyboard snapshot to play under it.
#[derive(Clone, Copy)]
pub struct PreviewRequest<'a> {
    /// Narration driving playback; `None` fails with `MissingAudio`.
    pub audio: Option<&'a dyn NarrationSource>,
    /// Storyboard snapshot in playback order.
    pub segments: &'a [SceneSegment],
}

impl<'a> PreviewRequest<'a> {
    /// Request with a narration source.
    pub fn new(audio: &'a dyn NarrationSource, segments: &'a [SceneSegment]) -> Self {
        Self {
            audio: Some(audio),
            segments,
        }
    }
}

/// Resources of one capture attempt. Dropping it releases the encoder and stops playback, on
/// success and on every error path.
struct CaptureSession<'s> {
    phase: CapturePhase,
    trace: Vec<CapturePhase>,
    encoder: &'s mut dyn Encoder,
    clock: &'s mut dyn PlaybackClock,
    chunks: Vec<Vec<u8>>,
}

impl<'s> CaptureSession<'s> {
    fn new(encoder: &'s mut dyn Encoder, clock: &'s mut dyn PlaybackClock) -> Self {
        Self {
            phase: CapturePhase::Idle,
            trace: vec![CapturePhase::Idle],
            encoder,
            clock,
            chunks: Vec::new(),
        }
    }

    fn advance(&mut self, event: CaptureEvent) -> StoryreelResult<()> {
        let next = self
            .phase
            .on(event)
            .map_err(|e| StoryreelError::Other(e.into()))?;
        tracing::info!(from = ?self.phase, to = ?next, "capture phase");
        self.phase = next;
        self.trace.push(next);
        Ok(())
    }

    fn collect_chunks(&mut self) -> StoryreelResult<()> {
        self.chunks.extend(self.encoder.take_chunks()?);
        Ok(())
    }
}

impl Drop for CaptureSession<'_> {
    fn drop(&mut self) {
        self.encoder.release();
        self.clock.stop();
        tracing::debug!(phase = ?self.phase, "capture session torn down");
    }
}

/// Records a storyboard under its narration into one encoded artifact.
///
/// Each capture walks `Idle -> Armed -> Recording -> Draining -> Done`; any error moves it to
/// `Failed`, discards partial output and releases every resource.
pub struct CaptureOrchestrator {
    opts: CaptureOpts,
    compositor: FrameCompositor,
    trace: Vec<CapturePhase>,
}

impl CaptureOrchestrator {
    /// Build an orchestrator; loads the configured font, if any.
    pub fn new(opts: CaptureOpts) -> StoryreelResult<Self> {
        let font = opts
            .font
            .as_deref()
            .map(CaptionFont::from_file)
            .transpose()?;
        Self::with_font(opts, font)
    }

    /// Build an orchestrator around an already loaded font.
    pub fn with_font(opts: CaptureOpts, font: Option<CaptionFont>) -> StoryreelResult<Self> {
        opts.validate()?;
        let compositor = FrameCompositor::new(opts.canvas, opts.style.clone(), font)?;
        Ok(Self {
            opts,
            compositor,
            trace: Vec::new(),
        })
    }

    /// Options this orchestrator was built with.
    pub fn opts(&self) -> &CaptureOpts {
        &self.opts
    }

    /// Phases visited by the most recent capture, in order.
    pub fn last_trace(&self) -> &[CapturePhase] {
        &self.trace
    }

    /// Capture with the playback clock selected by [`CaptureOpts::pacing`].
    pub fn capture(
        &mut self,
        req: PreviewRequest<'_>,
        encoder: &mut dyn Encoder,
    ) -> StoryreelResult<EncodedArtifact> {
        let tick = self.opts.fps.frame_interval();
        match self.opts.pacing {
            Pacing::Realtime => self.capture_with_clock(req, encoder, &mut RealtimeClock::new(tick)),
            Pacing::Offline => self.capture_with_clock(req, encoder, &mut OfflineClock::new(tick)),
        }
    }

    /// Capture driven by an explicit playback clock.
    #[tracing::instrument(skip_all, fields(segments = req.segments.len()))]
    pub fn capture_with_clock(
        &mut self,
        req: PreviewRequest<'_>,
        encoder: &mut dyn Encoder,
        clock: &mut dyn PlaybackClock,
    ) -> StoryreelResult<EncodedArtifact> {
        let mut session = CaptureSession::new(encoder, clock);
        let result = self.run(&mut session, req);
        if let Err(e) = &result {
            tracing::warn!(error = %e, phase = ?session.phase, "capture failed");
            if let Ok(failed) = session.phase.on(CaptureEvent::Fault) {
                session.phase = failed;
                session.trace.push(failed);
            }
        }
        self.trace = std::mem::take(&mut session.trace);
        drop(session);
        result
    }

    fn run(
        &mut self,
        session: &mut CaptureSession<'_>,
        req: PreviewRequest<'_>,
    ) -> StoryreelResult<EncodedArtifact> {
        // Idle -> Armed: every request-level check happens before anything is started.
        let audio = req.audio.ok_or(StoryreelError::MissingAudio)?;
        if req.segments.is_empty() {
            return Err(StoryreelError::EmptyStoryboard);
        }
        let meta = audio.load_metadata()?.validate()?;
        let images = resolve_images(req.segments)?;
        session.encoder.ensure_available()?;
        let timeline = allocate(req.segments, meta.duration_secs);
        session.advance(CaptureEvent::Armed)?;
        tracing::info!(
            narration = %audio.describe(),
            duration_secs = meta.duration_secs,
            segments = timeline.len(),
            "capture armed"
        );

        // Armed -> Recording: the sink runs before playback starts.
        let fps = self.opts.fps;
        let canvas = self.compositor.canvas();
        session.encoder.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
            audio: audio.encoder_input(),
        })?;
        session.clock.play(meta.duration_secs)?;
        if !session.clock.is_playing() {
            return Err(StoryreelError::invalid_audio(format!(
                "playback of {} did not start",
                audio.describe()
            )));
        }
        session.advance(CaptureEvent::PlaybackStarted)?;

        let total_frames = fps.secs_to_frames_round(meta.duration_secs).max(1);
        let mut render = RenderLoop::new(req.segments, &images, &timeline, &mut self.compositor)?;
        let mut next_frame = 0u64;

        while !session.clock.has_ended() {
            let t = session.clock.position_secs();
            let (_, frame) = render.tick(t)?;
            let due = (fps.secs_to_frames_floor(t + FRAME_EPSILON_SECS) + 1).min(total_frames);
            while next_frame < due {
                session.encoder.push_frame(FrameIndex(next_frame), frame)?;
                next_frame += 1;
            }
            session.collect_chunks()?;
            session.clock.wait_for_tick();
        }

        // Recording -> Draining: hold the tail frame to the end of the narration, then stop.
        session.advance(CaptureEvent::PlaybackEnded)?;
        let (_, frame) = render.tick(meta.duration_secs)?;
        while next_frame < total_frames {
            session.encoder.push_frame(FrameIndex(next_frame), frame)?;
            next_frame += 1;
        }
        let stats = render.stats();
        session.encoder.end()?;
        session.collect_chunks()?;
        if session.encoder.state() != RecorderState::Stopped {
            return Err(StoryreelError::encoder(
                "encoder did not acknowledge stop",
            ));
        }

        // Draining -> Done.
        session.advance(CaptureEvent::StopAcknowledged)?;
        let artifact = EncodedArtifact::from_chunks(
            std::mem::take(&mut session.chunks),
            session.encoder.mime_type(),
            fps.frames_to_secs(next_frame),
            next_frame,
        );
        tracing::info!(
            handle = %artifact.handle,
            bytes = artifact.len(),
            frames = artifact.frames,
            compositions = stats.compositions,
            "capture done"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/orchestrator.rs"]
mod tests;
