use super::*;

#[test]
fn defaults_match_portrait_preview() {
    let o = CaptureOpts::default();
    assert_eq!((o.canvas.width, o.canvas.height), (1080, 1920));
    assert_eq!(o.fps, Fps { num: 30, den: 1 });
    assert_eq!(o.pacing, Pacing::Realtime);
    assert_eq!(o.container, Container::Webm);
    assert_eq!(o.style.caption.max_lines, 2);
    assert!(o.validate().is_ok());
}

#[test]
fn partial_json_fills_defaults() {
    let o: CaptureOpts = serde_json::from_str(
        r##"{"pacing":"offline","container":"mp4","style":{"caption":{"font_size":40},"cta":{"title":"SUBSCRIBE"}}}"##,
    )
    .unwrap();
    assert_eq!(o.pacing, Pacing::Offline);
    assert_eq!(o.container, Container::Mp4);
    assert_eq!(o.style.caption.font_size, 40.0);
    assert_eq!(o.style.caption.stroke_width, 8.0);
    assert_eq!(o.style.cta.title, "SUBSCRIBE");
    assert_eq!(o.style.cta.subtitle, "(Like & Subscribe)");
}

#[test]
fn invalid_values_fail_validation() {
    let mut o = CaptureOpts::default();
    o.canvas.width = 1079;
    assert!(o.validate().is_err());

    let mut o = CaptureOpts::default();
    o.fps.den = 0;
    assert!(o.validate().is_err());

    let mut o = CaptureOpts::default();
    o.style.caption.max_lines = 0;
    assert!(o.validate().is_err());
}

#[test]
fn from_json_file_reports_parse_errors() {
    let path = std::env::temp_dir().join(format!("storyreel_opts_{}.json", std::process::id()));
    std::fs::write(&path, "{ not json").unwrap();
    let err = CaptureOpts::from_json_file(&path).unwrap_err();
    assert!(matches!(err, StoryreelError::Validation(_)));
    let _ = std::fs::remove_file(&path);
}
