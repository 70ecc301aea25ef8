/// Index of the segment active at time `t`.
///
/// Returns the greatest `i` with `cue_points[i] <= t`, clamped to `[0, len - 1]`: times before
/// the first cue map to `0`, times at or past the last cue stay on the last segment. A cue point
/// is an inclusive lower bound, so with duplicated cue points (zero-length segments) the later
/// segment wins. Never panics; an empty slice or a NaN time yields `0`.
pub fn locate(cue_points: &[f64], t: f64) -> usize {
    if cue_points.is_empty() || t.is_nan() {
        return 0;
    }
    // Upper bound: first index whose cue point is strictly after `t`.
    let upper = cue_points.partition_point(|&c| c <= t);
    upper.saturating_sub(1).min(cue_points.len() - 1)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/cue.rs"]
mod tests;
