use super::*;

#[test]
fn before_first_cue_is_zero() {
    assert_eq!(locate(&[0.0, 1.0, 2.0], -0.5), 0);
}

#[test]
fn at_or_after_last_cue_is_last() {
    let cues = [0.0, 1.0, 2.0];
    assert_eq!(locate(&cues, 2.0), 2);
    assert_eq!(locate(&cues, 1e9), 2);
    assert_eq!(locate(&cues, f64::INFINITY), 2);
}

#[test]
fn exact_cue_is_inclusive_lower_bound() {
    let cues = [0.0, 1.5, 3.0, 4.0];
    assert_eq!(locate(&cues, 0.0), 0);
    assert_eq!(locate(&cues, 1.5), 1);
    assert_eq!(locate(&cues, 1.4999), 0);
    assert_eq!(locate(&cues, 3.0), 2);
}

#[test]
fn duplicate_cues_pick_the_later_segment() {
    let cues = [0.0, 5.0, 5.0, 5.0, 9.0];
    assert_eq!(locate(&cues, 5.0), 3);
    assert_eq!(locate(&cues, 4.99), 0);
}

#[test]
fn degenerate_inputs_never_panic() {
    assert_eq!(locate(&[], 1.0), 0);
    assert_eq!(locate(&[0.0, 1.0], f64::NAN), 0);
    assert_eq!(locate(&[0.0], f64::NEG_INFINITY), 0);
}
