//! storyreel turns a narration track and an ordered storyboard of still images and caption
//! fragments into one synchronized video.
//!
//! The pipeline, leaf first:
//!
//! - [`allocate`] splits the narration length across segments by caption weight
//! - [`locate`] maps a playback position to the active segment
//! - [`FrameCompositor`] draws a contain-fitted image and a wrapped, outlined caption
//! - [`RenderLoop`] samples playback and re-composes when the active segment changes
//! - [`CaptureOrchestrator`] brackets playback with a recording [`Encoder`] and returns an
//!   [`EncodedArtifact`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod capture;
pub(crate) mod compose;
pub(crate) mod encode;
pub(crate) mod storyboard;
pub(crate) mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rect, Rgba8};
pub use crate::foundation::error::{StoryreelError, StoryreelResult};

pub use crate::assets::media::{AudioMetadata, is_ffprobe_on_path, probe_audio};
pub use crate::assets::store::{PreparedImage, load_image, resolve_images};
pub use crate::capture::artifact::{ArtifactHandle, EncodedArtifact};
pub use crate::capture::clock::{OfflineClock, PlaybackClock, RealtimeClock};
pub use crate::capture::opts::{CaptureOpts, Pacing};
pub use crate::capture::orchestrator::{
    CaptureOrchestrator, NarrationFile, NarrationSource, PreviewRequest, SilentNarration,
};
pub use crate::capture::render_loop::{RenderLoop, RenderLoopStats};
pub use crate::capture::state::{CaptureEvent, CapturePhase, IllegalTransition};
pub use crate::compose::caption::{
    CaptionLayout, CaptionLine, CaptionStyle, FixedAdvance, LEAD_IN_WORDS, TextMeasure,
    layout_caption, strip_lead_in, wrap_caption,
};
pub use crate::compose::fit::{contain_fit, fit_margins};
pub use crate::compose::frame::{CompositorStyle, CtaCardStyle, FrameCompositor, FrameRGBA};
pub use crate::compose::text::{CaptionFont, FontMeasure};
pub use crate::encode::ffmpeg::{
    Container, FfmpegEncoder, FfmpegEncoderOpts, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::encode::sink::{
    AudioInputConfig, Encoder, FrameSink, InMemoryEncoder, RecorderState, SinkConfig,
};
pub use crate::storyboard::model::{
    ImageSource, SceneSegment, ScriptVisual, Storyboard, StoryboardDoc,
};
pub use crate::timeline::allocate::{Timeline, allocate};
pub use crate::timeline::cue::locate;
