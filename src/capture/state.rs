/// Phase of one capture attempt.
///
/// ```text
/// Idle -> Armed -> Recording -> Draining -> Done
///   \________\__________\___________\-----> Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePhase {
    /// Nothing acquired yet.
    Idle,
    /// Narration and images resolved, encoder available.
    Armed,
    /// Encoder running and playback advancing.
    Recording,
    /// Playback ended; waiting for the encoder to flush.
    Draining,
    /// Artifact assembled.
    Done,
    /// Attempt aborted; resources released.
    Failed,
}

/// Inputs that drive [`CapturePhase`] forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Narration and images resolved, encoder available.
    Armed,
    /// Playback reported running after the encoder began.
    PlaybackStarted,
    /// Playback reached the end of the track.
    PlaybackEnded,
    /// The encoder confirmed it stopped.
    StopAcknowledged,
    /// Any error.
    Fault,
}

/// An event that is not valid in the current phase.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal capture transition: {event:?} in phase {from:?}")]
pub struct IllegalTransition {
    /// Phase the event arrived in.
    pub from: CapturePhase,
    /// The rejected event.
    pub event: CaptureEvent,
}

impl CapturePhase {
    /// `true` for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Apply `event`; anything outside the lifecycle table is rejected.
    pub fn on(self, event: CaptureEvent) -> Result<CapturePhase, IllegalTransition> {
        use CaptureEvent as E;
        use CapturePhase as P;

        match (self, event) {
            (P::Idle, E::Armed) => Ok(P::Armed),
            (P::Armed, E::PlaybackStarted) => Ok(P::Recording),
            (P::Recording, E::PlaybackEnded) => Ok(P::Draining),
            (P::Draining, E::StopAcknowledged) => Ok(P::Done),
            (from, E::Fault) if !from.is_terminal() => Ok(P::Failed),
            (from, event) => Err(IllegalTransition { from, event }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/state.rs"]
mod tests;
