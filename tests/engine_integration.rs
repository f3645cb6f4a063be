//! Integration tests for the rep engine
//!
//! Tests the full path: landmarks → joint angle → hysteresis → count/events

use repify::core::{RepEngine, SimulatedPose};
use repify::types::{
    LandmarkSet, Point2D, ReasonCode, RepState, Side,
    LEFT_ELBOW, LEFT_SHOULDER, LEFT_WRIST, LEFT_HIP, LEFT_KNEE, LEFT_ANKLE,
};
use std::sync::{Arc, Mutex};

/// Left-arm landmarks with the elbow at `degrees`
fn arm_frame(degrees: f64) -> LandmarkSet {
    let rad = degrees.to_radians();
    LandmarkSet::new()
        .with(LEFT_SHOULDER, Point2D::with_visibility(0.4, 0.3, 0.9))
        .with(LEFT_ELBOW, Point2D::with_visibility(0.4, 0.5, 0.9))
        .with(LEFT_WRIST, Point2D::with_visibility(0.4 + 0.2 * rad.sin(), 0.5 - 0.2 * rad.cos(), 0.9))
}

fn curl_engine() -> RepEngine {
    let mut engine = RepEngine::new();
    engine.start("bicep_curl", Side::Primary).unwrap();
    engine
}

/// Run a sequence of angles, return (states, rep flags)
fn run_angles(engine: &mut RepEngine, angles: &[f64]) -> (Vec<RepState>, Vec<bool>) {
    angles
        .iter()
        .map(|a| {
            let out = engine.process_frame(&arm_frame(*a));
            (out.state, out.rep_completed)
        })
        .unzip()
}

// =============================================================================
// SCENARIOS
// =============================================================================

/// Extension, dead zone, contraction, re-extension: one rep on frame 4
#[test]
fn test_scenario_single_rep() {
    let mut engine = curl_engine();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    engine.on_rep(move |e| sink.lock().unwrap().push(e.clone()));

    let (states, reps) = run_angles(&mut engine, &[170.0, 170.0, 100.0, 40.0, 170.0]);

    assert_eq!(
        states,
        vec![
            RepState::Extended,
            RepState::Extended,
            RepState::Extended,
            RepState::Contracted,
            RepState::Extended,
        ]
    );
    assert_eq!(reps, vec![false, false, false, true, false]);
    assert_eq!(engine.rep_count(), 1);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rep_count, 1);
    assert_eq!(events[0].exercise_id, "bicep_curl");
    assert_eq!(events[0].side, Side::Primary);
}

/// Contraction before any extension is not a rep
#[test]
fn test_scenario_contraction_first() {
    let mut engine = curl_engine();
    let (states, reps) = run_angles(&mut engine, &[40.0, 40.0, 170.0]);

    assert_eq!(states, vec![RepState::Waiting, RepState::Waiting, RepState::Extended]);
    assert!(reps.iter().all(|r| !r));
    assert_eq!(engine.rep_count(), 0);
}

/// Oscillating inside the dead zone never counts
#[test]
fn test_scenario_dead_zone_oscillation() {
    let mut engine = curl_engine();
    let (states, _) = run_angles(&mut engine, &[170.0, 100.0, 170.0, 100.0]);

    assert!(states.iter().all(|s| *s == RepState::Extended));
    assert_eq!(engine.rep_count(), 0);
}

/// A frame missing the vertex neither advances nor resets state
#[test]
fn test_scenario_dropout_mid_rep() {
    let mut engine = curl_engine();
    run_angles(&mut engine, &[170.0, 100.0]);
    let before = *engine.session();

    let mut occluded = arm_frame(40.0);
    occluded.remove(LEFT_ELBOW);
    let out = engine.process_frame(&occluded);

    assert_eq!(out.reason, ReasonCode::R001_LANDMARK_MISSING);
    assert_eq!(out.state, before.state);
    assert_eq!(out.angle, before.last_angle);
    assert_eq!(out.rep_count, before.rep_count);
    assert_eq!(*engine.session(), before);

    // Resumes from the pre-skip state
    let out = engine.process_frame(&arm_frame(40.0));
    assert_eq!(out.state, RepState::Contracted);
    assert_eq!(out.rep_count, 1);
}

// =============================================================================
// PROPERTIES
// =============================================================================

/// rep_count never decreases and rises by one per EXTENDED → CONTRACTED
#[test]
fn test_monotonic_count() {
    let mut engine = curl_engine();
    let angles = [
        120.0, 30.0, 165.0, 60.0, 45.0, 20.0, 175.0, 49.0, 161.0, 150.0, 10.0, 170.0, 100.0, 40.0,
    ];

    let mut last_count = 0;
    let mut last_state = engine.state();
    for a in angles {
        let out = engine.process_frame(&arm_frame(a));
        assert!(out.rep_count >= last_count);
        let counted = last_state == RepState::Extended && out.state == RepState::Contracted;
        assert_eq!(out.rep_count - last_count, counted as u32);
        last_count = out.rep_count;
        last_state = out.state;
    }
    assert_eq!(engine.rep_count(), 4);
}

/// Independent engines do not share state
#[test]
fn test_independent_sessions() {
    let mut a = curl_engine();
    let mut b = curl_engine();

    run_angles(&mut a, &[170.0, 40.0]);
    assert_eq!(a.rep_count(), 1);
    assert_eq!(b.rep_count(), 0);
    assert_eq!(b.state(), RepState::Waiting);

    run_angles(&mut b, &[170.0]);
    assert_eq!(a.state(), RepState::Contracted);
    assert_eq!(b.state(), RepState::Extended);
}

/// Squat reads the knee and uses the 90° contracted threshold
#[test]
fn test_squat_thresholds() {
    let knee_frame = |degrees: f64| {
        let rad = degrees.to_radians();
        LandmarkSet::new()
            .with(LEFT_HIP, Point2D::new(0.5, 0.3))
            .with(LEFT_KNEE, Point2D::new(0.5, 0.55))
            .with(LEFT_ANKLE, Point2D::new(0.5 + 0.25 * rad.sin(), 0.55 - 0.25 * rad.cos()))
    };

    let mut engine = RepEngine::new();
    engine.start("squat", Side::Primary).unwrap();

    engine.process_frame(&knee_frame(170.0));
    // Above the curl threshold, below the squat one
    let out = engine.process_frame(&knee_frame(85.0));
    assert_eq!(out.state, RepState::Contracted);
    assert_eq!(out.rep_count, 1);
}

// =============================================================================
// SIMULATED SOURCE
// =============================================================================

/// One rep per simulated cycle
#[test]
fn test_simulated_cycles_count_reps() {
    let mut engine = curl_engine();
    let def = engine.definition().unwrap().clone();
    let source = SimulatedPose::for_exercise(&def, Side::Primary);
    let frames = source.period_frames() as usize * 4;

    for landmarks in source.take(frames) {
        engine.process_frame(&landmarks);
    }

    assert_eq!(engine.rep_count(), 4);
    assert_eq!(engine.frames_skipped(), 0);
}

/// Periodic occlusion is skipped without losing reps
#[test]
fn test_simulated_dropout_keeps_count() {
    let mut engine = RepEngine::new();
    engine.start("shoulder_press", Side::Mirrored).unwrap();
    let def = engine.definition().unwrap().clone();
    let source = SimulatedPose::for_exercise(&def, Side::Mirrored).with_dropout(7);
    let frames = source.period_frames() as usize * 3;

    for landmarks in source.take(frames) {
        engine.process_frame(&landmarks);
    }

    assert_eq!(engine.rep_count(), 3);
    assert!(engine.frames_skipped() > 0);
    assert_eq!(engine.frames_processed() + engine.frames_skipped(), frames as u64);
}

/// Frames delivered as MediaPipe-style JSON arrays
#[test]
fn test_json_frames() {
    let mut engine = curl_engine();

    let frame = |wrist: &str| {
        let mut slots = vec!["null".to_string(); 33];
        slots[LEFT_SHOULDER] = r#"{"x": 0.4, "y": 0.3, "z": -0.1, "visibility": 0.99}"#.to_string();
        slots[LEFT_ELBOW] = r#"{"x": 0.4, "y": 0.5, "z": -0.1, "visibility": 0.98}"#.to_string();
        slots[LEFT_WRIST] = wrist.to_string();
        format!("[{}]", slots.join(","))
    };

    // Straight down: 180°
    let straight: LandmarkSet = serde_json::from_str(&frame(r#"{"x": 0.4, "y": 0.7}"#)).unwrap();
    // Folded back up toward the shoulder: ~11°
    let curled: LandmarkSet = serde_json::from_str(&frame(r#"{"x": 0.42, "y": 0.4}"#)).unwrap();
    // Wrist lost
    let lost: LandmarkSet = serde_json::from_str(&frame("null")).unwrap();

    assert_eq!(engine.process_frame(&straight).state, RepState::Extended);
    assert_eq!(engine.process_frame(&lost).reason, ReasonCode::R001_LANDMARK_MISSING);
    let out = engine.process_frame(&curled);
    assert_eq!(out.state, RepState::Contracted);
    assert_eq!(out.rep_count, 1);
}
