use depth_core::config::MissionConfig;
use depth_core::feedback::{Feedback, FeedbackSink};
use depth_core::mission::DepthMonitor;
use depth_core::position::PositionStore;
use depth_core::quadrature::RawStep;

#[derive(Default)]
struct RecordingSink {
    events: Vec<Feedback>,
}

impl FeedbackSink for RecordingSink {
    fn emit(&mut self, feedback: Feedback) {
        self.events.push(feedback);
    }
}

#[test]
fn descent_below_floor_clamps_and_resets_counter() {
    let store = PositionStore::new();
    let mut monitor = DepthMonitor::new(&MissionConfig::lander()).expect("valid config");
    let mut sink = RecordingSink::default();

    for _ in 0..5 {
        store.apply_step(RawStep::CounterClockwise);
    }
    let report = monitor.poll(&store, &mut sink);

    assert_eq!(report.depth, -60);
    assert!(report.clamped);
    assert_eq!(store.count(), 0);
    assert_eq!(sink.events, vec![Feedback::number(-60)]);
}

#[test]
fn climb_after_clamp_starts_from_the_floor() {
    let store = PositionStore::new();
    let mut monitor = DepthMonitor::new(&MissionConfig::lander()).expect("valid config");
    let mut sink = RecordingSink::default();

    for _ in 0..20 {
        store.apply_step(RawStep::CounterClockwise);
    }
    let _ = monitor.poll(&store, &mut sink);

    store.apply_step(RawStep::Clockwise);
    let report = monitor.poll(&store, &mut sink);
    assert_eq!(report.depth, -59);
    assert!(!report.clamped);
}

#[test]
fn clamped_poll_never_reports_a_rise() {
    let store = PositionStore::new();
    let mut monitor = DepthMonitor::new(&MissionConfig::lander()).expect("valid config");
    let mut sink = RecordingSink::default();

    for _ in 0..3 {
        store.apply_step(RawStep::CounterClockwise);
    }
    let report = monitor.poll(&store, &mut sink);
    assert!(!report.rate_exceeded);
    assert!(report.fired.is_empty());
}
