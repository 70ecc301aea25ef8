use std::time::{Duration, Instant};

use crate::foundation::error::{StoryreelError, StoryreelResult};

/// Narration playback as seen by the capture loop: a position that advances once `play` is
/// called, and a fixed-rate tick to sample it with.
pub trait PlaybackClock {
    /// Start playback of a track `duration_secs` long.
    fn play(&mut self, duration_secs: f64) -> StoryreelResult<()>;

    /// `true` between a successful `play` and the end of the track or `stop`.
    fn is_playing(&self) -> bool;

    /// Current playback position in seconds, clamped to the track length.
    fn position_secs(&self) -> f64;

    /// `true` once the position reached the end of the track.
    fn has_ended(&self) -> bool;

    /// Block until the next tick is due.
    fn wait_for_tick(&mut self);

    /// Halt playback. Idempotent.
    fn stop(&mut self);
}

fn check_duration(duration_secs: f64) -> StoryreelResult<()> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(StoryreelError::invalid_audio(format!(
            "cannot play a track of {duration_secs} seconds"
        )));
    }
    Ok(())
}

/// Wall-clock playback with a deadline-based tick.
///
/// Missed deadlines are skipped rather than replayed, so a slow tick never causes a burst.
#[derive(Debug)]
pub struct RealtimeClock {
    tick: Duration,
    epoch: Option<Instant>,
    next_deadline: Option<Instant>,
    duration_secs: f64,
    stopped: bool,
}

impl RealtimeClock {
    /// Clock sampling every `tick` of wall time.
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            epoch: None,
            next_deadline: None,
            duration_secs: 0.0,
            stopped: false,
        }
    }

    /// `true` after [`PlaybackClock::stop`].
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn elapsed_secs(&self) -> f64 {
        self.epoch.map_or(0.0, |e| e.elapsed().as_secs_f64())
    }
}

impl PlaybackClock for RealtimeClock {
    fn play(&mut self, duration_secs: f64) -> StoryreelResult<()> {
        check_duration(duration_secs)?;
        let now = Instant::now();
        self.epoch = Some(now);
        self.next_deadline = Some(now + self.tick);
        self.duration_secs = duration_secs;
        self.stopped = false;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.epoch.is_some() && !self.stopped && !self.has_ended()
    }

    fn position_secs(&self) -> f64 {
        self.elapsed_secs().min(self.duration_secs)
    }

    fn has_ended(&self) -> bool {
        self.epoch.is_some() && self.elapsed_secs() >= self.duration_secs
    }

    fn wait_for_tick(&mut self) {
        let Some(deadline) = self.next_deadline else {
            return;
        };
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
            self.next_deadline = Some(deadline + self.tick);
        } else {
            self.next_deadline = Some(catch_up(deadline, now, self.tick));
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.next_deadline = None;
    }
}

/// First deadline on the `tick` grid anchored at `deadline` that lies after `now`.
///
/// Falls back to `now + tick` when the grid cannot be represented.
fn catch_up(deadline: Instant, now: Instant, tick: Duration) -> Instant {
    let behind = now.saturating_duration_since(deadline);
    let skipped = u32::try_from(behind.as_nanos() / tick.as_nanos().max(1)).unwrap_or(u32::MAX);
    if skipped > 0 {
        tracing::trace!(skipped, "capture tick fell behind");
    }
    tick.checked_mul(skipped.saturating_add(1))
        .and_then(|step| deadline.checked_add(step))
        .filter(|next| *next > now)
        .unwrap_or_else(|| now.checked_add(tick).unwrap_or(now))
}

/// Virtual playback that advances exactly one tick per `wait_for_tick`.
///
/// Produces the same frame sequence as [`RealtimeClock`] under ideal scheduling, as fast as the
/// compositor and encoder allow.
#[derive(Debug)]
pub struct OfflineClock {
    tick: Duration,
    ticks: u64,
    duration_secs: f64,
    started: bool,
    stopped: bool,
}

impl OfflineClock {
    /// Clock advancing `tick` of virtual time per wait.
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            ticks: 0,
            duration_secs: 0.0,
            started: false,
            stopped: false,
        }
    }

    /// `true` after [`PlaybackClock::stop`].
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Ticks elapsed since `play`.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn elapsed_secs(&self) -> f64 {
        self.ticks as f64 * self.tick.as_secs_f64()
    }
}

impl PlaybackClock for OfflineClock {
    fn play(&mut self, duration_secs: f64) -> StoryreelResult<()> {
        check_duration(duration_secs)?;
        if self.tick.is_zero() {
            return Err(StoryreelError::validation("clock tick must be non-zero"));
        }
        self.ticks = 0;
        self.duration_secs = duration_secs;
        self.started = true;
        self.stopped = false;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.started && !self.stopped && !self.has_ended()
    }

    fn position_secs(&self) -> f64 {
        self.elapsed_secs().min(self.duration_secs)
    }

    fn has_ended(&self) -> bool {
        self.started && self.elapsed_secs() >= self.duration_secs
    }

    fn wait_for_tick(&mut self) {
        if self.started && !self.stopped {
            self.ticks += 1;
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/clock.rs"]
mod tests;
