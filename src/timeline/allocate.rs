use crate::timeline::cue::locate;

/// Drift above which raw allocations are rescaled back onto the total (seconds).
pub(crate) const RESCALE_EPSILON_SECS: f64 = 0.001;

/// Per-segment timing derived from caption weights and the narration length.
///
/// `cue_points[i]` is the start of segment `i` in seconds; `durations[i]` its length. The final
/// segment runs to `total_secs`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Timeline {
    cue_points: Vec<f64>,
    durations: Vec<f64>,
    total_secs: f64,
}

impl Timeline {
    /// Start time of every segment, ascending, first is `0`.
    pub fn cue_points(&self) -> &[f64] {
        &self.cue_points
    }

    /// Per-segment durations in seconds.
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Sum of all durations.
    pub fn total_secs(&self) -> f64 {
        self.total_secs
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.cue_points.len()
    }

    /// `true` when there are no segments.
    pub fn is_empty(&self) -> bool {
        self.cue_points.is_empty()
    }

    /// Active segment at playback time `t` (see [`locate`]).
    pub fn locate(&self, t: f64) -> usize {
        locate(&self.cue_points, t)
    }

    /// `[start, end)` of segment `i` in seconds.
    pub fn segment_range(&self, i: usize) -> Option<std::ops::Range<f64>> {
        let start = *self.cue_points.get(i)?;
        Some(start..start + self.durations[i])
    }
}

/// Split `total_secs` across `segments` in proportion to their trimmed character counts.
///
/// When every segment is empty each gets an equal share. Raw shares are rescaled onto the total
/// if their floating-point sum drifts by more than a millisecond. Cue points are the prefix sums
/// of the durations, starting at `0`.
///
/// `total_secs` must be finite and positive; callers validate it (narration metadata) first.
pub fn allocate<S: AsRef<str>>(segments: &[S], total_secs: f64) -> Timeline {
    debug_assert!(
        total_secs.is_finite() && total_secs > 0.0,
        "allocate requires a finite, positive duration"
    );
    let total = if total_secs.is_finite() && total_secs > 0.0 {
        total_secs
    } else {
        0.0
    };

    let n = segments.len();
    if n == 0 {
        return Timeline {
            cue_points: Vec::new(),
            durations: Vec::new(),
            total_secs: total,
        };
    }

    let mut weights: Vec<f64> = segments
        .iter()
        .map(|s| s.as_ref().trim().chars().count() as f64)
        .collect();
    let mut total_weight: f64 = weights.iter().sum();
    if total_weight == 0.0 {
        weights.iter_mut().for_each(|w| *w = 1.0);
        total_weight = n as f64;
    }

    let mut durations: Vec<f64> = weights
        .iter()
        .map(|w| (w / total_weight) * total)
        .collect();

    let actual: f64 = durations.iter().sum();
    if actual > 0.0 && (actual - total).abs() > RESCALE_EPSILON_SECS {
        let k = total / actual;
        durations.iter_mut().for_each(|d| *d *= k);
    }

    let mut cue_points = Vec::with_capacity(n);
    let mut acc = 0.0f64;
    for d in &durations[..n - 1] {
        cue_points.push(acc);
        acc += d.max(0.0);
    }
    cue_points.push(acc.min(total));

    // Derive durations from the cue points so the tail closes exactly on the total.
    for i in 0..n - 1 {
        durations[i] = (cue_points[i + 1] - cue_points[i]).max(0.0);
    }
    durations[n - 1] = (total - cue_points[n - 1]).max(0.0);

    Timeline {
        cue_points,
        durations,
        total_secs: total,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/allocate.rs"]
mod tests;
