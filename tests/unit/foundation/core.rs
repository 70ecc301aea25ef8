use super::*;

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn fps_round_uses_nearest_frame() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(10.0), 300);
    assert_eq!(fps.secs_to_frames_round(9.99), 300);
    assert_eq!(fps.secs_to_frames_floor(9.99), 299);
}

#[test]
fn canvas_validation_catches_bad_sizes() {
    assert!(Canvas::PORTRAIT_1080.validate().is_ok());
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 11,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 70_000,
            height: 10
        }
        .validate()
        .is_err()
    );
}

#[test]
fn hex_colors_parse_with_and_without_alpha() {
    assert_eq!(
        Rgba8::parse_hex("#0f172a").unwrap(),
        Rgba8::opaque(0x0f, 0x17, 0x2a)
    );
    assert_eq!(
        Rgba8::parse_hex("94a3b880").unwrap(),
        Rgba8 {
            r: 0x94,
            g: 0xa3,
            b: 0xb8,
            a: 0x80
        }
    );
    assert!(Rgba8::parse_hex("#12345").is_err());
    assert!(Rgba8::parse_hex("#zzzzzz").is_err());
}

#[test]
fn rgba8_serde_uses_hex_strings() {
    let c: Rgba8 = serde_json::from_str("\"#ffffff\"").unwrap();
    assert_eq!(c, Rgba8::WHITE);
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#ffffffff\"");
}
