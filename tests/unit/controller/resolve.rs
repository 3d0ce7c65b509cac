use super::*;
use crate::platform::memory::StaticLayout;

fn vp() -> Viewport {
    Viewport::new(1000.0, 800.0).unwrap()
}

fn layout() -> StaticLayout {
    StaticLayout::new()
        .with("orb", ElementRect::new(1000.0, 100.0, 200.0, 200.0))
        .with("word", ElementRect::new(1500.0, 600.0, 100.0, 40.0))
}

#[test]
fn document_space_offsets_are_relative_to_origin() {
    let layout = layout();
    let mut ctx = ResolveCtx::new("primary", &layout, vp(), Space::Document, 0.0);
    ctx.set_origin(&PointSpec::anchor("orb"));
    assert_eq!(ctx.offset(&PointSpec::anchor("word")), Point::new(450.0, 420.0));
    assert_eq!(ctx.offset(&PointSpec::fixed(10.0, -5.0)), Point::new(10.0, -5.0));
    assert!(ctx.into_faults().is_empty());
}

#[test]
fn viewport_space_subtracts_capture_scroll() {
    let layout = layout();
    let mut ctx = ResolveCtx::new("stat", &layout, vp(), Space::Viewport, 1200.0);
    assert_eq!(ctx.point(&PointSpec::anchor("word")), Point::new(650.0, 320.0));
    assert_eq!(
        ctx.point(&PointSpec::Viewport { fx: 0.5, fy: 0.5 }),
        Point::new(500.0, 400.0)
    );
}

#[test]
fn document_space_viewport_points_follow_capture_scroll() {
    let layout = layout();
    let mut ctx = ResolveCtx::new("exit", &layout, vp(), Space::Document, 300.0);
    assert_eq!(
        ctx.point(&PointSpec::Viewport { fx: 0.0, fy: 1.0 }),
        Point::new(0.0, 1100.0)
    );
}

#[test]
fn missing_anchor_uses_fallback_and_records_fault() {
    let layout = layout();
    let mut ctx = ResolveCtx::new("vision", &layout, vp(), Space::Viewport, 0.0);
    let with_fallback = PointSpec::Anchor {
        anchor: "gone".into(),
        fx: 0.5,
        fy: 0.5,
        dx: 0.0,
        dy: 0.0,
        fallback: Some(Box::new(PointSpec::Viewport { fx: 0.25, fy: 0.75 })),
    };
    assert_eq!(ctx.point(&with_fallback), Point::new(250.0, 600.0));
    assert_eq!(ctx.point(&PointSpec::anchor("gone")), Point::new(500.0, 400.0));
    let faults = ctx.into_faults();
    assert_eq!(
        faults,
        vec![Fault::MissingAnchor {
            controller: "vision".into(),
            anchor: "gone".into(),
        }]
    );
}

#[test]
fn between_and_offset_compose() {
    let layout = layout();
    let mut ctx = ResolveCtx::new("c", &layout, vp(), Space::Document, 0.0);
    let mid = PointSpec::Between {
        from: Box::new(PointSpec::fixed(0.0, 0.0)),
        to: Box::new(PointSpec::fixed(100.0, 200.0)),
        tx: 0.5,
        ty: 0.25,
    };
    assert_eq!(ctx.point(&mid), Point::new(50.0, 50.0));
    let moved = PointSpec::Offset {
        base: Box::new(mid),
        dx: 10.0,
        dy: 0.0,
        vx: 0.0,
        vy: 0.5,
    };
    assert_eq!(ctx.point(&moved), Point::new(60.0, 450.0));
}

#[test]
fn measured_scalars_and_composites() {
    let layout = layout();
    let mut ctx = ResolveCtx::new("c", &layout, vp(), Space::Document, 0.0);
    let scale = ctx.scalar_curve(&ScalarCurveSpec::Hold(ScalarSpec::Measured(
        Measure::AnchorExtent {
            anchor: "word".into(),
            axis: Axis::Width,
            factor: 0.02,
            fallback: 1.0,
        },
    )));
    assert_eq!(scale, ScalarCurve::Hold(2.0));
    let vh = ctx.scalar_curve(&ScalarCurveSpec::Hold(ScalarSpec::Measured(
        Measure::ViewportExtent {
            axis: Axis::Height,
            factor: 0.5,
        },
    )));
    assert_eq!(vh, ScalarCurve::Hold(400.0));

    let path = ctx
        .path(&PathSpec::Composite {
            points: (0..7).map(|i| PointSpec::fixed(i as f64, 0.0)).collect(),
            steps_per_segment: None,
        })
        .unwrap();
    assert_eq!(path.end(), Point::new(6.0, 0.0));
}
