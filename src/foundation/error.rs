/// Convenience result type used across the crate.
pub type StoryreelResult<T> = Result<T, StoryreelError>;

/// Error surface of the compositor and capture pipeline.
///
/// Request-level failures (`MissingAudio` through `EncoderUnavailable`) are raised before
/// recording starts. `Encoder` covers failures after recording began; the attempt is torn down
/// and no partial artifact is returned.
#[derive(thiserror::Error, Debug)]
pub enum StoryreelError {
    /// No narration source was supplied.
    #[error("missing audio: no narration source supplied")]
    MissingAudio,

    /// Narration metadata could not be read, or its duration is non-finite / non-positive.
    #[error("invalid audio: {0}")]
    InvalidAudio(String),

    /// The storyboard snapshot contains no segments.
    #[error("empty storyboard: at least one segment is required")]
    EmptyStoryboard,

    /// A referenced image failed to load or decode.
    #[error("image resolution failure: {0}")]
    ImageResolution(String),

    /// The host cannot provide a combined audio+video capture sink.
    #[error("encoder unavailable: {0}")]
    EncoderUnavailable(String),

    /// The encoder failed while recording or draining.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other failure, with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryreelError {
    /// Build an `InvalidAudio` error.
    pub fn invalid_audio(msg: impl Into<String>) -> Self {
        Self::InvalidAudio(msg.into())
    }

    /// Build an `ImageResolution` error.
    pub fn image_resolution(msg: impl Into<String>) -> Self {
        Self::ImageResolution(msg.into())
    }

    /// Build an `EncoderUnavailable` error.
    pub fn encoder_unavailable(msg: impl Into<String>) -> Self {
        Self::EncoderUnavailable(msg.into())
    }

    /// Build an `Encoder` error.
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Build a `Validation` error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
