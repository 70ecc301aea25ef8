use super::*;

#[test]
fn offline_clock_advances_one_tick_per_wait() {
    let mut c = OfflineClock::new(Duration::from_millis(250));
    assert!(!c.is_playing());
    c.play(1.0).unwrap();
    assert!(c.is_playing());
    assert_eq!(c.position_secs(), 0.0);

    c.wait_for_tick();
    c.wait_for_tick();
    assert!((c.position_secs() - 0.5).abs() < 1e-12);
    assert!(!c.has_ended());

    c.wait_for_tick();
    c.wait_for_tick();
    assert!(c.has_ended());
    assert!(!c.is_playing());
    c.wait_for_tick();
    assert_eq!(c.position_secs(), 1.0);
}

#[test]
fn offline_clock_does_not_tick_before_play_or_after_stop() {
    let mut c = OfflineClock::new(Duration::from_millis(100));
    c.wait_for_tick();
    assert_eq!(c.ticks(), 0);
    c.play(10.0).unwrap();
    c.wait_for_tick();
    c.stop();
    c.stop();
    c.wait_for_tick();
    assert_eq!(c.ticks(), 1);
    assert!(c.is_stopped());
    assert!(!c.is_playing());
}

#[test]
fn play_rejects_unusable_durations() {
    let mut c = OfflineClock::new(Duration::from_millis(100));
    assert!(c.play(0.0).is_err());
    assert!(c.play(f64::NAN).is_err());
    let mut r = RealtimeClock::new(Duration::from_millis(10));
    assert!(r.play(-1.0).is_err());
}

#[test]
fn realtime_clock_tracks_wall_time() {
    let mut c = RealtimeClock::new(Duration::from_millis(5));
    c.play(0.05).unwrap();
    assert!(c.is_playing());
    let start = Instant::now();
    while !c.has_ended() {
        c.wait_for_tick();
        assert!(start.elapsed() < Duration::from_secs(5));
    }
    assert!(start.elapsed() >= Duration::from_millis(45));
    assert_eq!(c.position_secs(), 0.05);
    c.stop();
    assert!(c.is_stopped());
}

#[test]
fn late_tick_skips_to_the_next_grid_deadline() {
    let tick = Duration::from_millis(10);
    let deadline = Instant::now();
    let now = deadline + Duration::from_millis(25);
    assert_eq!(catch_up(deadline, now, tick), deadline + Duration::from_millis(30));
    assert_eq!(
        catch_up(deadline, deadline, tick),
        deadline + Duration::from_millis(10)
    );
}

#[test]
fn skipped_tick_count_saturates() {
    // 10 s behind on a 1 ns grid is more ticks than fit in u32.
    let tick = Duration::from_nanos(1);
    let deadline = Instant::now();
    let now = deadline + Duration::from_secs(10);
    let next = catch_up(deadline, now, tick);
    assert!(next > now && next <= now + tick);
}

#[test]
fn unrepresentable_deadline_falls_back_to_now() {
    let deadline = Instant::now();
    let now = deadline + Duration::from_millis(5);
    assert_eq!(catch_up(deadline, now, Duration::MAX), now);
}
