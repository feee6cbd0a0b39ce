//! Integration tests for the perception stage: relevance gating, tracking
//! and clearance across consecutive cycles

use drishti_core::{BoundingBox, Detection, Direction, EnvironmentMode, FrameSize, Motion, Urgency, Zone};
use drishti_eye::{ClearanceAnalyzer, EnvironmentClassifier, ObjectTracker, VisionConfig};

fn det(label: &str, score: f32, bbox: [f32; 4]) -> Detection {
    Detection::new(label, score, BoundingBox::from(bbox))
}

fn run_cycle(
    env: &mut EnvironmentClassifier,
    tracker: &mut ObjectTracker,
    detections: &[Detection],
    frame: FrameSize,
    now_ms: u64,
) {
    env.observe(detections);
    let relevant: Vec<Detection> = detections.iter().filter(|d| env.is_relevant(d)).cloned().collect();
    tracker.update(&relevant, frame, now_ms);
    tracker.sweep(now_ms);
}

#[test]
fn test_car_scenario_confirms_on_second_cycle() {
    let config = VisionConfig::default();
    let mut env = EnvironmentClassifier::new(&config);
    let mut tracker = ObjectTracker::new(&config);
    let frame = FrameSize::new(100, 100);
    let car = det("car", 0.9, [80.0, 40.0, 60.0, 50.0]);

    run_cycle(&mut env, &mut tracker, &[car.clone()], frame, 0);
    assert_eq!(tracker.get("car").unwrap().stability, 1);

    run_cycle(&mut env, &mut tracker, &[car.clone()], frame, 150);
    let tracked = tracker.get("car").unwrap();
    assert_eq!(tracked.stability, 2);
    assert_eq!(tracked.urgency, Urgency::Medium);
    assert_eq!(tracked.zone, Zone::FarRight);
    assert_eq!(tracked.motion, Motion::Static);

    run_cycle(&mut env, &mut tracker, &[car], frame, 300);
    assert_eq!(tracker.get("car").unwrap().stability, 3);
}

#[test]
fn test_indoor_mode_filters_out_of_context_classes() {
    let config = VisionConfig::default();
    let mut env = EnvironmentClassifier::new(&config);
    let mut tracker = ObjectTracker::new(&config);
    let frame = FrameSize::new(640, 480);

    let detections = vec![
        det("chair", 0.8, [10.0, 200.0, 100.0, 150.0]),
        det("tv", 0.9, [300.0, 50.0, 200.0, 120.0]),
        det("book", 0.7, [250.0, 300.0, 40.0, 30.0]),
        det("car", 0.8, [500.0, 200.0, 50.0, 50.0]),
    ];
    run_cycle(&mut env, &mut tracker, &detections, frame, 0);

    assert_eq!(env.mode(), EnvironmentMode::Indoor);
    assert!(tracker.get("chair").is_some());
    assert!(tracker.get("tv").is_some());
    assert!(tracker.get("car").is_none(), "off-context class below 0.85 must not be tracked");
}

#[test]
fn test_clearance_ignores_relevance() {
    let frame = FrameSize::new(100, 100);
    // A low-confidence box still obstructs the path
    let detections = vec![det("unknown thing", 0.3, [0.0, 0.0, 50.0, 100.0]), det("cup", 0.9, [60.0, 0.0, 10.0, 100.0])];
    assert_eq!(ClearanceAnalyzer::analyze(&detections, frame).recommended, Direction::Right);
}

#[test]
fn test_unseen_class_is_evicted_and_reacquired_cold() {
    let config = VisionConfig::default();
    let mut env = EnvironmentClassifier::new(&config);
    let mut tracker = ObjectTracker::new(&config);
    let frame = FrameSize::new(100, 100);
    let dog = det("dog", 0.9, [10.0, 10.0, 20.0, 20.0]);

    for i in 0..5u64 {
        run_cycle(&mut env, &mut tracker, &[dog.clone()], frame, i * 150);
    }
    assert_eq!(tracker.get("dog").unwrap().stability, 5);

    // Cycles keep running with nothing in view
    let mut now = 600;
    while now <= 1800 {
        now += 150;
        run_cycle(&mut env, &mut tracker, &[], frame, now);
    }
    assert!(tracker.get("dog").is_none());

    run_cycle(&mut env, &mut tracker, &[dog], frame, now + 150);
    assert_eq!(tracker.get("dog").unwrap().stability, 1);
}
