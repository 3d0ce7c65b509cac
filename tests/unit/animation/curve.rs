use super::*;
use crate::foundation::math::approx_eq;

fn close(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x, 1e-9) && approx_eq(a.y, b.y, 1e-9)
}

#[test]
fn cubic_interpolates_endpoints() {
    let (p0, p1, p2, p3) = (
        Point::new(-3.0, 7.5),
        Point::new(40.0, -12.0),
        Point::new(2.0, 99.0),
        Point::new(18.25, 4.0),
    );
    assert!(close(evaluate_cubic(0.0, p0, p1, p2, p3), p0));
    assert!(close(evaluate_cubic(1.0, p0, p1, p2, p3), p3));
}

#[test]
fn symmetric_cubic_midpoint() {
    // 0.125·p0 + 0.375·p1 + 0.375·p2 + 0.125·p3
    let mid = evaluate_cubic(
        0.5,
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(20.0, 10.0),
    );
    assert!(close(mid, Point::new(10.0, 5.0)), "{mid:?}");
}

fn two_segment_sweep() -> Vec<CubicBez> {
    vec![
        CubicBez::new((0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)),
        CubicBez::new((10.0, 0.0), (10.0, -10.0), (20.0, -10.0), (20.0, 0.0)),
    ]
}

#[test]
fn composite_selects_segment_and_rescales() {
    let segs = two_segment_sweep();
    assert!(close(evaluate_composite(0.0, &segs), Point::new(0.0, 0.0)));
    assert!(close(evaluate_composite(0.5, &segs), Point::new(10.0, 0.0)));
    assert!(close(evaluate_composite(1.0, &segs), Point::new(20.0, 0.0)));
    assert!(close(evaluate_composite(0.25, &segs), segs[0].eval(0.5)));
    assert!(close(evaluate_composite(0.75, &segs), segs[1].eval(0.5)));
}

#[test]
fn composite_is_continuous_at_the_joint() {
    let segs = two_segment_sweep();
    let before = evaluate_composite(0.5 - 1e-9, &segs);
    let after = evaluate_composite(0.5 + 1e-9, &segs);
    assert!(before.distance(after) < 1e-6);
}

#[test]
fn empty_composite_is_origin() {
    assert_eq!(evaluate_composite(0.3, &[]), Point::ORIGIN);
}

#[test]
fn composite_path_rejects_gaps() {
    let segs = vec![
        CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0)),
        CubicBez::new((3.5, 0.0), (4.0, 1.0), (5.0, 1.0), (6.0, 0.0)),
    ];
    assert!(CompositePath::new(segs, None).is_err());
    assert!(CompositePath::new(two_segment_sweep(), Some(0)).is_err());
    assert!(CompositePath::new(Vec::new(), None).is_err());
}

#[test]
fn waypoint_sampling_passes_through_samples() {
    let path = CompositePath::new(two_segment_sweep(), Some(6)).unwrap();
    let segs = two_segment_sweep();
    // Waypoint 3 of 12 sits at segment 0, local 0.5.
    assert!(close(path.eval(3.0 / 12.0), segs[0].eval(0.5)));
    assert!(close(path.eval(1.0), Point::new(20.0, 0.0)));
    // Between waypoints the path is straight.
    let a = segs[0].eval(0.0);
    let b = segs[0].eval(1.0 / 6.0);
    assert!(close(path.eval(0.5 / 12.0), a.lerp(b, 0.5)));
}

#[test]
fn from_points_requires_shared_endpoints_layout() {
    let pts = [
        Point::new(0.0, 0.0),
        Point::new(0.0, 10.0),
        Point::new(10.0, 10.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, -10.0),
        Point::new(20.0, -10.0),
        Point::new(20.0, 0.0),
    ];
    let path = CompositePath::from_points(&pts, None).unwrap();
    assert_eq!(path.segments().len(), 2);
    assert!(CompositePath::from_points(&pts[..5], None).is_err());
}

#[test]
fn scalar_curves() {
    assert_eq!(ScalarCurve::Hold(0.85).eval(0.3), 0.85);
    assert!(approx_eq(
        ScalarCurve::Linear { from: 0.6, to: 0.85 }.eval(1.0),
        0.85,
        1e-12
    ));
    let g = ScalarCurve::Geometric { from: 1.2, to: 0.3 };
    assert!(approx_eq(g.eval(0.5), 0.6, 1e-12));
    let w = ScalarCurve::Wave {
        base: 26.0,
        amplitude: 4.0,
        cycles: 1.0,
        phase: 0.0,
    };
    assert!(approx_eq(w.eval(0.25), 30.0, 1e-9));
}

#[test]
fn orbit_circles_its_centre() {
    let orbit = PathCurve::Orbit(Box::new(Orbit {
        center: PathCurve::Hold(Point::new(100.0, 50.0)),
        radius: ScalarCurve::Hold(20.0),
        angle: ScalarCurve::Linear {
            from: 0.0,
            to: std::f64::consts::PI,
        },
        squash: 0.5,
    }));
    assert!(close(orbit.start(), Point::new(120.0, 50.0)));
    assert!(close(orbit.end(), Point::new(80.0, 50.0)));
    // Quarter turn: vertical radius squashed.
    assert!(close(orbit.eval(0.5), Point::new(100.0, 60.0)));
}

#[test]
fn line_and_hold() {
    let line = PathCurve::Line {
        from: Point::new(0.0, 0.0),
        to: Point::new(10.0, -10.0),
    };
    assert!(close(line.eval(0.5), Point::new(5.0, -5.0)));
    assert!(close(line.start(), Point::ORIGIN));
    assert!(close(line.end(), Point::new(10.0, -10.0)));
}
