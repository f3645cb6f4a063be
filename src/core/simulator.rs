//! Simulated pose source
//!
//! Stands in for a camera + pose model: moves one limb so the joint angle
//! follows a cosine between `max_angle` (frame 0) and `min_angle` (half a
//! period later). Every frame carries only the three landmarks of the joint.

use std::f64::consts::PI;
use crate::SIM_PERIOD_FRAMES;
use crate::types::{ExerciseDefinition, JointTriple, LandmarkSet, Point2D, Side};

/// Margin past each threshold so every cycle crosses both
const THRESHOLD_MARGIN: f64 = 15.0;

/// Segment length in normalized image coordinates
const SEGMENT: f64 = 0.2;

/// Confidence reported on every simulated landmark
const SIM_VISIBILITY: f64 = 0.9;

/// Synthetic landmark stream for one joint
#[derive(Debug, Clone)]
pub struct SimulatedPose {
    joint: JointTriple,
    min_angle: f64,
    max_angle: f64,
    period_frames: u32,
    /// Drop the vertex landmark on every n-th frame
    dropout_every: Option<u32>,
    frame: u64,
}

impl SimulatedPose {
    /// Sweep `joint` between `min_angle` and `max_angle` degrees
    pub fn new(joint: JointTriple, min_angle: f64, max_angle: f64, period_frames: u32) -> Self {
        Self {
            joint,
            min_angle: min_angle.clamp(0.0, 180.0),
            max_angle: max_angle.clamp(0.0, 180.0),
            period_frames: period_frames.max(2),
            dropout_every: None,
            frame: 0,
        }
    }

    /// Sweep that clears both thresholds of an exercise
    pub fn for_exercise(def: &ExerciseDefinition, side: Side) -> Self {
        Self::new(
            def.joint(side),
            def.contracted_threshold - THRESHOLD_MARGIN,
            def.extended_threshold + THRESHOLD_MARGIN,
            SIM_PERIOD_FRAMES,
        )
    }

    /// Simulate occlusion of the vertex every `n` frames
    pub fn with_dropout(mut self, n: u32) -> Self {
        self.dropout_every = (n > 0).then_some(n);
        self
    }

    /// Change the cycle length
    pub fn with_period(mut self, period_frames: u32) -> Self {
        self.period_frames = period_frames.max(2);
        self
    }

    pub fn period_frames(&self) -> u32 {
        self.period_frames
    }

    /// Joint angle the simulator targets at frame `n`
    pub fn angle_at(&self, n: u64) -> f64 {
        let phase = 2.0 * PI * (n % self.period_frames as u64) as f64 / self.period_frames as f64;
        let mid = (self.max_angle + self.min_angle) / 2.0;
        let amplitude = (self.max_angle - self.min_angle) / 2.0;
        mid + amplitude * phase.cos()
    }

    /// Landmarks for frame `n`
    pub fn frame_at(&self, n: u64) -> LandmarkSet {
        let vertex = Point2D::with_visibility(0.5, 0.5, SIM_VISIBILITY);

        // Proximal straight up from the vertex, distal rotated from it by the angle
        let up = -PI / 2.0;
        let proximal = Point2D::with_visibility(
            vertex.x + SEGMENT * up.cos(),
            vertex.y + SEGMENT * up.sin(),
            SIM_VISIBILITY,
        );
        let theta = up + self.angle_at(n).to_radians();
        let distal = Point2D::with_visibility(
            vertex.x + SEGMENT * theta.cos(),
            vertex.y + SEGMENT * theta.sin(),
            SIM_VISIBILITY,
        );

        let mut set = LandmarkSet::new()
            .with(self.joint.proximal, proximal)
            .with(self.joint.distal, distal);
        let dropped = self
            .dropout_every
            .map(|k| n % k as u64 == k as u64 - 1)
            .unwrap_or(false);
        if !dropped {
            set.insert(self.joint.vertex, vertex);
        }
        set
    }
}

impl Iterator for SimulatedPose {
    type Item = LandmarkSet;

    fn next(&mut self) -> Option<Self::Item> {
        let set = self.frame_at(self.frame);
        self.frame += 1;
        Some(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::joint_angle;
    use crate::types::{LEFT_ELBOW, LEFT_SHOULDER, LEFT_WRIST};

    fn arm() -> JointTriple {
        JointTriple::new(LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST)
    }

    #[test]
    fn test_angle_sweep_endpoints() {
        let sim = SimulatedPose::new(arm(), 35.0, 175.0, 60);
        assert!((sim.angle_at(0) - 175.0).abs() < 1e-9);
        assert!((sim.angle_at(30) - 35.0).abs() < 1e-9);
        assert!((sim.angle_at(60) - 175.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_geometry_matches_target() {
        let sim = SimulatedPose::new(arm(), 35.0, 175.0, 60);
        for n in 0..60 {
            let set = sim.frame_at(n);
            let angle = joint_angle(
                set.get(LEFT_SHOULDER).unwrap(),
                set.get(LEFT_ELBOW).unwrap(),
                set.get(LEFT_WRIST).unwrap(),
            );
            assert!((angle - sim.angle_at(n)).abs() < 1e-6, "frame {}: {} vs {}", n, angle, sim.angle_at(n));
        }
    }

    #[test]
    fn test_dropout_removes_vertex() {
        let sim = SimulatedPose::new(arm(), 35.0, 175.0, 60).with_dropout(4);
        assert!(sim.frame_at(2).get(LEFT_ELBOW).is_some());
        assert!(sim.frame_at(3).get(LEFT_ELBOW).is_none());
        assert!(sim.frame_at(3).get(LEFT_WRIST).is_some());
        assert!(sim.frame_at(7).get(LEFT_ELBOW).is_none());
    }

    #[test]
    fn test_iterator_advances() {
        let frames: Vec<LandmarkSet> = SimulatedPose::new(arm(), 35.0, 175.0, 4).take(5).collect();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0], frames[4]);
        assert_ne!(frames[0], frames[2]);
    }
}
