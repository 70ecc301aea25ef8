use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::default(),
        audio: None,
    }
}

fn frame(v: u8) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![v; 16],
        premultiplied: true,
    }
}

#[test]
fn in_memory_encoder_emits_one_chunk_per_frame() {
    let mut enc = InMemoryEncoder::new();
    assert_eq!(enc.state(), RecorderState::Inactive);
    enc.begin(cfg()).unwrap();
    assert_eq!(enc.state(), RecorderState::Recording);

    enc.push_frame(FrameIndex(0), &frame(1)).unwrap();
    enc.push_frame(FrameIndex(1), &frame(1)).unwrap();
    let chunks = enc.take_chunks().unwrap();
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.len() == 16));
    assert_eq!(&chunks[1][..8], &1u64.to_le_bytes());
    assert!(enc.take_chunks().unwrap().is_empty());

    // Identical frames digest identically.
    assert_eq!(enc.frames()[0].1, enc.frames()[1].1);
}

#[test]
fn end_is_idempotent() {
    let mut enc = InMemoryEncoder::new();
    enc.begin(cfg()).unwrap();
    enc.end().unwrap();
    enc.end().unwrap();
    assert_eq!(enc.state(), RecorderState::Stopped);
    assert_eq!(enc.end_calls(), 2);
}

#[test]
fn frames_after_stop_are_rejected() {
    let mut enc = InMemoryEncoder::new();
    enc.begin(cfg()).unwrap();
    enc.end().unwrap();
    assert!(enc.push_frame(FrameIndex(0), &frame(0)).is_err());
}

#[test]
fn out_of_order_frames_are_rejected() {
    let mut enc = InMemoryEncoder::new();
    enc.begin(cfg()).unwrap();
    enc.push_frame(FrameIndex(3), &frame(0)).unwrap();
    let err = enc.push_frame(FrameIndex(3), &frame(0)).unwrap_err();
    assert!(matches!(err, StoryreelError::Encoder(_)));
}

#[test]
fn injected_failure_fires_at_requested_frame() {
    let mut enc = InMemoryEncoder::failing_at(1);
    enc.begin(cfg()).unwrap();
    enc.push_frame(FrameIndex(0), &frame(0)).unwrap();
    assert!(enc.push_frame(FrameIndex(1), &frame(0)).is_err());
}

#[test]
fn unavailable_encoder_reports_unavailable() {
    let enc = InMemoryEncoder::unavailable();
    assert!(matches!(
        enc.ensure_available(),
        Err(StoryreelError::EncoderUnavailable(_))
    ));
}

#[test]
fn release_stops_and_drops_pending_chunks() {
    let mut enc = InMemoryEncoder::new();
    enc.begin(cfg()).unwrap();
    enc.push_frame(FrameIndex(0), &frame(0)).unwrap();
    enc.release();
    enc.release();
    assert!(enc.is_released());
    assert_eq!(enc.state(), RecorderState::Stopped);
    assert!(enc.take_chunks().unwrap().is_empty());
}
