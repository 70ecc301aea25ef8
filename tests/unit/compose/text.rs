use super::*;
use crate::compose::caption::wrap_caption;

const FONT: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/data/fonts/DejaVuSansCondensed-Bold.ttf"
);

fn font() -> CaptionFont {
    CaptionFont::from_file(Path::new(FONT)).unwrap()
}

#[test]
fn font_file_registers_a_family() {
    let f = font();
    assert!(f.family().contains("DejaVu"), "{}", f.family());
}

#[test]
fn missing_font_file_is_a_validation_error() {
    let err = CaptionFont::from_file(Path::new("/no/such/font.ttf")).unwrap_err();
    assert!(matches!(err, StoryreelError::Validation(_)));
}

#[test]
fn measured_width_grows_with_text() {
    let mut f = font();
    let mut m = f.measure(52.0, true);
    let one = m.measure("Hxp").unwrap();
    let two = m.measure("Hxp Hxp").unwrap();
    assert!(one > 52.0 && one < 3.0 * 52.0, "{one}");
    assert!(two > 2.0 * one, "{two} vs {one}");
}

#[test]
fn trailing_space_is_measured() {
    let mut f = font();
    let mut m = f.measure(52.0, true);
    assert!(m.measure("word ").unwrap() > m.measure("word").unwrap());
}

#[test]
fn invalid_size_surfaces_as_error() {
    let mut f = font();
    let mut m = f.measure(0.0, true);
    assert!(m.measure("text").is_err());
}

#[test]
fn wrapped_lines_fit_the_measured_width() {
    let mut f = font();
    let mut m = f.measure(52.0, true);
    let text = "campurkan tepung dengan gula lalu aduk sampai benar benar rata";
    let lines = wrap_caption(text, 500.0, 10, &mut m).unwrap();
    assert!(lines.len() >= 3, "{lines:?}");
    for line in &lines {
        assert!(m.measure(line).unwrap() <= 500.0, "{line}");
    }
    assert_eq!(lines.join(" "), text);
}
