use super::*;

#[test]
fn bursts_of_requests_collapse_into_one_frame() {
    let mut s = FrameScheduler::new(SchedulerConfig::default());
    assert!(s.request());
    assert!(!s.request());
    assert!(!s.request());
    assert!(s.is_pending());

    let t = s.begin_frame(16.0).unwrap();
    assert_eq!(t.index, 0);
    assert!(!t.revalidate);
    assert!(s.begin_frame(32.0).is_none());
    assert_eq!(s.frames(), 1);
    assert_eq!(s.request_counts(), (3, 2));

    assert!(s.request());
    assert_eq!(s.begin_frame(48.0).unwrap().index, 1);
}

#[test]
fn revalidation_fires_once_after_delay() {
    let mut s = FrameScheduler::new(SchedulerConfig::default());
    s.arm_revalidation(100.0);
    assert_eq!(s.next_deadline_ms(), Some(1300.0));
    assert!(s.begin_frame(1299.0).is_none());

    let t = s.begin_frame(1300.0).unwrap();
    assert!(t.revalidate);
    assert_eq!(s.next_deadline_ms(), None);

    s.request();
    assert!(!s.begin_frame(5000.0).unwrap().revalidate);
}

#[test]
fn revalidation_piggybacks_on_a_pending_frame() {
    let mut s = FrameScheduler::new(SchedulerConfig {
        revalidate_after_ms: 50.0,
    });
    s.arm_revalidation(0.0);
    s.request();
    assert!(!s.begin_frame(16.0).unwrap().revalidate);
    s.request();
    assert!(s.begin_frame(64.0).unwrap().revalidate);
}

#[test]
fn cancel_makes_everything_inert() {
    let mut s = FrameScheduler::new(SchedulerConfig::default());
    s.arm_revalidation(0.0);
    s.request();
    s.cancel();
    assert!(!s.is_alive());
    assert!(!s.is_pending());
    assert!(s.begin_frame(10_000.0).is_none());
    assert!(!s.request());
    s.arm_revalidation(0.0);
    assert_eq!(s.next_deadline_ms(), None);
}

#[test]
fn config_defaults_from_json() {
    let c: SchedulerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(c.revalidate_after_ms, 1200.0);
}
