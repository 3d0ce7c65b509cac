use super::*;

#[test]
fn viewport_rejects_degenerate_sizes() {
    assert!(Viewport::new(0.0, 800.0).is_err());
    assert!(Viewport::new(1280.0, f64::NAN).is_err());
    let vp = Viewport::new(1280.0, 800.0).unwrap();
    assert_eq!(vp.center(), Point::new(640.0, 400.0));
}

#[test]
fn element_rect_fractions() {
    let r = ElementRect::new(1000.0, 100.0, 200.0, 50.0);
    assert_eq!(r.bottom(), 1050.0);
    assert_eq!(r.right(), 300.0);
    assert_eq!(r.center(), Point::new(200.0, 1025.0));
    assert_eq!(r.point_at(0.0, 1.0), Point::new(100.0, 1050.0));
}

#[test]
fn sanitize_replaces_non_finite_channels() {
    let bad = VisualState {
        offset_x: f64::NAN,
        offset_y: 12.0,
        scale: f64::INFINITY,
        opacity: 3.0,
    };
    let clean = bad.sanitized(VisualState::HIDDEN);
    assert!(clean.is_finite());
    assert_eq!(clean.offset_x, 0.0);
    assert_eq!(clean.offset_y, 12.0);
    assert_eq!(clean.scale, 1.0);
    assert_eq!(clean.opacity, 1.0);
}

#[test]
fn hidden_is_not_visible() {
    assert!(!VisualState::HIDDEN.is_visible());
    assert!(VisualState::HIDDEN.with_opacity(0.2).is_visible());
    assert_eq!(VisualState::default(), VisualState::HIDDEN);
}
