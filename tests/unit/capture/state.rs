use super::*;

#[test]
fn happy_path_walks_every_phase_once() {
    let mut phase = CapturePhase::Idle;
    let mut seen = vec![phase];
    for ev in [
        CaptureEvent::Armed,
        CaptureEvent::PlaybackStarted,
        CaptureEvent::PlaybackEnded,
        CaptureEvent::StopAcknowledged,
    ] {
        phase = phase.on(ev).unwrap();
        seen.push(phase);
    }
    assert_eq!(
        seen,
        vec![
            CapturePhase::Idle,
            CapturePhase::Armed,
            CapturePhase::Recording,
            CapturePhase::Draining,
            CapturePhase::Done,
        ]
    );
}

#[test]
fn fault_is_accepted_from_every_live_phase() {
    for p in [
        CapturePhase::Idle,
        CapturePhase::Armed,
        CapturePhase::Recording,
        CapturePhase::Draining,
    ] {
        assert_eq!(p.on(CaptureEvent::Fault), Ok(CapturePhase::Failed));
    }
}

#[test]
fn terminal_phases_absorb_nothing() {
    for p in [CapturePhase::Done, CapturePhase::Failed] {
        assert!(p.is_terminal());
        assert!(p.on(CaptureEvent::Fault).is_err());
        assert!(p.on(CaptureEvent::Armed).is_err());
    }
}

#[test]
fn skipping_a_phase_is_illegal() {
    let err = CapturePhase::Idle
        .on(CaptureEvent::PlaybackStarted)
        .unwrap_err();
    assert_eq!(err.from, CapturePhase::Idle);
    assert_eq!(err.event, CaptureEvent::PlaybackStarted);
    assert!(
        CapturePhase::Recording
            .on(CaptureEvent::StopAcknowledged)
            .is_err()
    );
    assert!(CapturePhase::Armed.on(CaptureEvent::Armed).is_err());
}
