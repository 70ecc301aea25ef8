use super::*;

#[test]
fn landscape_into_portrait_is_letterboxed() {
    // 16:9 image into a 9:16 surface fills the width, bands top and bottom.
    let r = contain_fit(1080.0, 1920.0, 1920.0, 1080.0);
    assert_eq!(r.x0, 0.0);
    assert_eq!(r.width(), 1080.0);
    assert!((r.height() - 607.5).abs() < 1e-9);
    let (mx, my) = fit_margins(1080.0, 1920.0, r);
    assert_eq!(mx, 0.0);
    assert!(my > 0.0);
}

#[test]
fn portrait_into_landscape_is_pillarboxed() {
    // 9:16 image into a 16:9 surface fills the height.
    let r = contain_fit(1920.0, 1080.0, 1080.0, 1920.0);
    let (mx, my) = fit_margins(1920.0, 1080.0, r);
    assert!(mx > 0.0);
    assert_eq!(my, 0.0);
    assert_eq!(r.height(), 1080.0);
    assert!((r.center().x - 960.0).abs() < 1e-9);
}

#[test]
fn matching_aspect_has_no_margins() {
    let r = contain_fit(1080.0, 1920.0, 540.0, 960.0);
    assert_eq!(fit_margins(1080.0, 1920.0, r), (0.0, 0.0));
    assert_eq!(r, Rect::new(0.0, 0.0, 1080.0, 1920.0));
}

#[test]
fn fitted_rect_preserves_image_aspect() {
    let r = contain_fit(1080.0, 1920.0, 1000.0, 1000.0);
    assert!((r.width() / r.height() - 1.0).abs() < 1e-12);
    assert!((r.center().y - 960.0).abs() < 1e-9);
}

#[test]
fn degenerate_image_collapses_to_center() {
    let r = contain_fit(100.0, 200.0, 0.0, 50.0);
    assert_eq!(r.area(), 0.0);
    assert_eq!(r.center(), kurbo::Point::new(50.0, 100.0));
}
