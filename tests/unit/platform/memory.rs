use super::*;

#[test]
fn layout_parses_and_measures() {
    let json = r#"{
        "elements": { "bridge": { "top": 1000.0, "left": 0.0, "width": 1280.0, "height": 600.0 } },
        "document_height": 5200.0
    }"#;
    let layout = StaticLayout::from_reader(json.as_bytes()).unwrap();
    let r = layout.measure(&ElementId::from("bridge")).unwrap();
    assert_eq!(r.top, 1000.0);
    assert_eq!(layout.document_height(), Some(5200.0));
    assert!(layout.measure(&ElementId::from("vision")).is_none());
}

#[test]
fn non_finite_rects_are_unmeasurable() {
    let layout = StaticLayout::new().with("ghost", ElementRect::new(f64::NAN, 0.0, 1.0, 1.0));
    assert!(layout.measure(&ElementId::from("ghost")).is_none());
}

#[test]
fn bad_layout_json_is_a_validation_error() {
    let err = StaticLayout::from_reader("{ nope".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("validation error"));
}

#[test]
fn recording_sink_keeps_last_write() {
    let mut sink = RecordingSink::new();
    let id = ElementId::from("orb");
    sink.set_visual_state(&id, VisualState::HIDDEN);
    sink.set_visual_state(&id, VisualState::HIDDEN.with_opacity(0.85));
    assert_eq!(sink.writes(), 2);
    assert_eq!(sink.get(&id).unwrap().opacity, 0.85);
    assert_eq!(sink.visible(), vec![&id]);
}
