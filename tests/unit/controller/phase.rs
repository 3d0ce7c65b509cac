use super::*;
use crate::foundation::math::approx_eq;

fn hold_phase(start: f64, end: f64, y: f64) -> Phase {
    Phase {
        start,
        end,
        position: PathCurve::Line {
            from: Point::new(0.0, y),
            to: Point::new(0.0, y + 100.0),
        },
        scale: ScalarCurve::Hold(1.0),
        opacity: ScalarCurve::Linear { from: 0.0, to: 1.0 },
        ease: Ease::Linear,
        pinned: false,
    }
}

#[test]
fn ranges_must_be_sorted_and_disjoint() {
    assert!(validate_ranges([(0.0, 0.4), (0.4, 1.0)]).is_ok());
    assert!(validate_ranges([(0.0, 0.5), (0.4, 1.0)]).is_err());
    assert!(validate_ranges([(0.5, 0.6), (0.1, 0.2)]).is_err());
    assert!(validate_ranges([(0.0, 1.2)]).is_err());
    assert!(validate_ranges([(0.6, 0.5)]).is_err());
    assert!(validate_ranges([(f64::NAN, 0.5)]).is_err());
    assert!(validate_ranges(std::iter::empty()).is_err());
}

#[test]
fn locate_inside_and_in_gaps() {
    let table = PhaseTable::new(vec![hold_phase(0.0, 0.4, 0.0), hold_phase(0.6, 1.0, 500.0)])
        .unwrap();

    let at = table.locate(0.2);
    assert_eq!(at.index, 0);
    assert!(at.inside);
    assert!(approx_eq(at.t, 0.5, 1e-12));

    // Gap holds the end of the preceding phase.
    let at = table.locate(0.5);
    assert_eq!((at.index, at.t, at.inside), (0, 1.0, false));
    let (_, s) = table.sample(0.5);
    assert_eq!(s.position, Point::new(0.0, 100.0));
    assert_eq!(s.opacity, 1.0);

    let at = table.locate(0.8);
    assert_eq!(at.index, 1);
    assert!(approx_eq(at.t, 0.5, 1e-12));

    let (at, s) = table.end_sample();
    assert_eq!(at.index, 1);
    assert_eq!(s.position, Point::new(0.0, 600.0));
}

#[test]
fn progress_before_first_phase_holds_its_start() {
    let table = PhaseTable::new(vec![hold_phase(0.3, 1.0, 10.0)]).unwrap();
    let (at, s) = table.sample(0.1);
    assert_eq!((at.index, at.t, at.inside), (0, 0.0, false));
    assert_eq!(s.position, Point::new(0.0, 10.0));
    assert_eq!(s.opacity, 0.0);
}

#[test]
fn zero_width_phase_is_complete_at_its_instant() {
    let table = PhaseTable::new(vec![hold_phase(0.5, 0.5, 0.0)]).unwrap();
    assert_eq!(table.locate(0.5).t, 1.0);
}

#[test]
fn easing_applies_to_phase_local_t() {
    let mut ph = hold_phase(0.0, 1.0, 0.0);
    ph.ease = Ease::InQuad;
    assert!(approx_eq(ph.sample(0.5).position.y, 25.0, 1e-9));
}

#[test]
fn phase_def_json_defaults() {
    let def: PhaseDef = serde_json::from_str(
        r#"{ "start": 0.0, "end": 0.5,
             "position": { "line": { "from": { "fixed": { "x": 0, "y": 0 } },
                                     "to": { "anchor": { "anchor": "word" } } } },
             "opacity": { "linear": { "from": 0.0, "to": 0.85 } } }"#,
    )
    .unwrap();
    assert_eq!(def.scale, ScalarCurveSpec::hold(1.0));
    assert_eq!(def.opacity, ScalarCurveSpec::linear(0.0, 0.85));
    assert_eq!(def.ease, Ease::Linear);
    assert!(!def.pinned);
    assert!(def.validate().is_ok());
}

#[test]
fn measured_scalars_parse_untagged() {
    let s: ScalarSpec = serde_json::from_str(
        r#"{ "anchor_extent": { "anchor": "card", "axis": "width", "factor": 0.01, "fallback": 1.0 } }"#,
    )
    .unwrap();
    assert!(matches!(s, ScalarSpec::Measured(Measure::AnchorExtent { .. })));
    let s: ScalarSpec = serde_json::from_str("2.5").unwrap();
    assert_eq!(s, ScalarSpec::Literal(2.5));
}

#[test]
fn composite_specs_need_3n_plus_1_points() {
    let pts = vec![PointSpec::fixed(0.0, 0.0); 5];
    let spec = PathSpec::Composite {
        points: pts,
        steps_per_segment: None,
    };
    assert!(spec.validate().is_err());
    let spec = PathSpec::Composite {
        points: vec![PointSpec::fixed(0.0, 0.0); 7],
        steps_per_segment: Some(0),
    };
    assert!(spec.validate().is_err());
}

#[test]
fn non_finite_literals_are_rejected() {
    let def = PhaseDef::new(0.0, 1.0, PathSpec::Hold(PointSpec::fixed(f64::NAN, 0.0)));
    assert!(def.validate().is_err());
    let def = PhaseDef::new(0.0, 1.0, PathSpec::Hold(PointSpec::anchor("")));
    assert!(def.validate().is_err());
}
