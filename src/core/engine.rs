//! Rep Engine: hysteresis state machine over joint angles
//!
//! State transitions (evaluated once per frame):
//! - any ≠ EXTENDED → EXTENDED: angle > extended threshold
//! - EXTENDED → CONTRACTED: angle < contracted threshold (rep counted)
//! - otherwise unchanged
//!
//! A contraction seen from WAITING is not counted: a rep needs a full
//! extension first. Frames missing any of the three landmarks are skipped
//! without touching the session.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use chrono::Utc;
use tracing::{debug, info, trace, warn};
use crate::core::exercises::ExerciseTable;
use crate::core::geometry::joint_angle;
use crate::error::ConfigurationError;
use crate::types::{
    ExerciseDefinition, FrameOutput, JointTriple, LandmarkSet, Point2D, ReasonCode,
    RepCompleted, RepState, SessionSummary, Side, format_elapsed,
};

/// Callback invoked synchronously on every counted rep
pub type RepListener = Box<dyn FnMut(&RepCompleted) + Send + Sync>;

/// Engine tuning that is not part of an exercise definition
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineConfig {
    /// Landmarks whose visibility is present and below this are treated as
    /// missing. `None` applies no floor: only absent landmarks are missing.
    pub min_visibility: Option<f64>,
}

/// Mutable per-session state, owned by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepSession {
    pub state: RepState,
    pub rep_count: u32,
    pub last_angle: f64,
}

impl Default for RepSession {
    fn default() -> Self {
        Self {
            state: RepState::Waiting,
            rep_count: 0,
            last_angle: 0.0,
        }
    }
}

/// Exercise selected at `start()`
#[derive(Debug, Clone)]
struct ActiveExercise {
    id: String,
    side: Side,
    definition: ExerciseDefinition,
}

/// Rep counting engine
pub struct RepEngine {
    table: Arc<ExerciseTable>,
    config: EngineConfig,
    active: Option<ActiveExercise>,
    tracking: bool,
    session: RepSession,
    /// When tracking began
    started_at: Option<Instant>,
    /// When tracking stopped (freezes elapsed time)
    stopped_at: Option<Instant>,
    frames_processed: u64,
    frames_skipped: u64,
    listeners: Vec<RepListener>,
}

impl fmt::Debug for RepEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepEngine")
            .field("config", &self.config)
            .field("active", &self.active)
            .field("tracking", &self.tracking)
            .field("session", &self.session)
            .field("frames_processed", &self.frames_processed)
            .field("frames_skipped", &self.frames_skipped)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for RepEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RepEngine {
    /// Engine over the built-in exercise table
    pub fn new() -> Self {
        Self::with_table(Arc::new(ExerciseTable::builtin()))
    }

    /// Engine over a custom table
    pub fn with_table(table: Arc<ExerciseTable>) -> Self {
        Self::with_config(table, EngineConfig::default())
    }

    /// Engine over a custom table and config
    pub fn with_config(table: Arc<ExerciseTable>, config: EngineConfig) -> Self {
        Self {
            table,
            config,
            active: None,
            tracking: false,
            session: RepSession::default(),
            started_at: None,
            stopped_at: None,
            frames_processed: 0,
            frames_skipped: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a rep-completed listener
    pub fn on_rep<F>(&mut self, listener: F)
    where
        F: FnMut(&RepCompleted) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Select an exercise and side, zero the session and begin tracking
    ///
    /// On error the engine is left exactly as it was.
    pub fn start(&mut self, exercise_id: &str, side: Side) -> Result<(), ConfigurationError> {
        let definition = match self.table.resolve(exercise_id) {
            Ok(def) => def.clone(),
            Err(e) => {
                warn!(exercise = exercise_id, error = %e, "refusing to start session");
                return Err(e);
            }
        };

        info!(
            exercise = exercise_id,
            %side,
            joint = definition.joint(side).joint_name(),
            extended = definition.extended_threshold,
            contracted = definition.contracted_threshold,
            "tracking started"
        );

        self.active = Some(ActiveExercise {
            id: exercise_id.to_string(),
            side,
            definition,
        });
        self.session = RepSession::default();
        self.tracking = true;
        self.started_at = Some(Instant::now());
        self.stopped_at = None;
        self.frames_processed = 0;
        self.frames_skipped = 0;
        Ok(())
    }

    /// Stop accepting frames; count and angle stay readable
    pub fn stop(&mut self) {
        if self.tracking {
            self.tracking = false;
            self.stopped_at = Some(Instant::now());
            info!(reps = self.session.rep_count, "tracking stopped");
        }
    }

    /// Stop, zero the count and return to WAITING
    pub fn reset(&mut self) {
        self.stop();
        self.session = RepSession::default();
        self.started_at = None;
        self.stopped_at = None;
        self.frames_processed = 0;
        self.frames_skipped = 0;
        debug!("session reset");
    }

    // =========================================================================
    // FRAME PROCESSING
    // =========================================================================

    /// Feed one landmark set, return the resulting snapshot
    pub fn process_frame(&mut self, landmarks: &LandmarkSet) -> FrameOutput {
        if !self.tracking {
            return self.output(ReasonCode::R001_NOT_TRACKING);
        }
        let (joint, extended, contracted) = match &self.active {
            Some(active) => (
                active.definition.joint(active.side),
                active.definition.extended_threshold,
                active.definition.contracted_threshold,
            ),
            None => return self.output(ReasonCode::R001_NOT_TRACKING),
        };

        let Some((proximal, vertex, distal)) = self.extract(landmarks, joint) else {
            self.frames_skipped += 1;
            trace!(joint = joint.joint_name(), "frame skipped, landmark missing");
            return self.output(ReasonCode::R001_LANDMARK_MISSING);
        };
        self.frames_processed += 1;

        let angle = joint_angle(proximal, vertex, distal);
        self.session.last_angle = angle;

        let (new_state, reason) = compute_transition(self.session.state, angle, extended, contracted);
        if new_state != self.session.state {
            debug!(from = %self.session.state, to = %new_state, angle, "state transition");
            self.session.state = new_state;
        }
        if reason == ReasonCode::R005_TRANSITION_TO_CONTRACTED {
            self.session.rep_count += 1;
            self.notify(angle);
        }

        self.output(reason)
    }

    /// Pull the three configured landmarks, honouring the visibility floor
    fn extract<'a>(
        &self,
        landmarks: &'a LandmarkSet,
        joint: JointTriple,
    ) -> Option<(&'a Point2D, &'a Point2D, &'a Point2D)> {
        let usable = |index: usize| {
            landmarks.get(index).filter(|p| match (self.config.min_visibility, p.visibility) {
                (Some(floor), Some(v)) => v >= floor,
                _ => true,
            })
        };
        Some((usable(joint.proximal)?, usable(joint.vertex)?, usable(joint.distal)?))
    }

    /// Fire listeners for the rep just counted
    fn notify(&mut self, angle: f64) {
        let Some(active) = &self.active else {
            return;
        };
        let event = RepCompleted {
            exercise_id: active.id.clone(),
            side: active.side,
            rep_count: self.session.rep_count,
            angle,
            timestamp: Utc::now(),
        };
        info!(exercise = %event.exercise_id, reps = event.rep_count, angle, "rep completed");
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    fn output(&self, reason: ReasonCode) -> FrameOutput {
        FrameOutput::new(
            self.session.state,
            self.session.last_angle,
            self.session.rep_count,
            reason,
            self.elapsed().as_millis() as u64,
        )
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    /// Current snapshot without processing a frame
    pub fn snapshot(&self) -> FrameOutput {
        if self.tracking {
            self.output(state_reason(self.session.state))
        } else {
            self.output(ReasonCode::R001_NOT_TRACKING)
        }
    }

    /// Report for the current (or last) session; `None` before any start
    pub fn summary(&self) -> Option<SessionSummary> {
        let active = self.active.as_ref()?;
        let elapsed_ms = self.elapsed().as_millis() as u64;
        Some(SessionSummary {
            exercise_id: active.id.clone(),
            exercise_name: active.definition.name.clone(),
            side: active.side,
            rep_count: self.session.rep_count,
            frames_processed: self.frames_processed,
            frames_skipped: self.frames_skipped,
            elapsed_ms,
            elapsed: format_elapsed(elapsed_ms / 1000),
        })
    }

    /// Workout time since `start()`, frozen at `stop()`, zero after `reset()`
    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => stop.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub fn session(&self) -> &RepSession {
        &self.session
    }

    pub fn state(&self) -> RepState {
        self.session.state
    }

    pub fn rep_count(&self) -> u32 {
        self.session.rep_count
    }

    pub fn last_angle(&self) -> f64 {
        self.session.last_angle
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Selected exercise id
    pub fn exercise_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.id.as_str())
    }

    /// Selected side
    pub fn side(&self) -> Option<Side> {
        self.active.as_ref().map(|a| a.side)
    }

    /// Selected exercise definition
    pub fn definition(&self) -> Option<&ExerciseDefinition> {
        self.active.as_ref().map(|a| &a.definition)
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    pub fn table(&self) -> &ExerciseTable {
        &self.table
    }
}

/// Next state and reason for one angle
fn compute_transition(
    state: RepState,
    angle: f64,
    extended: f64,
    contracted: f64,
) -> (RepState, ReasonCode) {
    if angle > extended && state != RepState::Extended {
        (RepState::Extended, ReasonCode::R005_TRANSITION_TO_EXTENDED)
    } else if angle < contracted && state == RepState::Extended {
        (RepState::Contracted, ReasonCode::R005_TRANSITION_TO_CONTRACTED)
    } else if angle < contracted && state == RepState::Waiting {
        (state, ReasonCode::R004_CONTRACTED_BEFORE_EXTENSION)
    } else if angle >= contracted && angle <= extended {
        (state, ReasonCode::R004_ANGLE_IN_DEAD_ZONE)
    } else {
        (state, state_reason(state))
    }
}

fn state_reason(state: RepState) -> ReasonCode {
    match state {
        RepState::Waiting => ReasonCode::R002_STATE_WAITING,
        RepState::Extended => ReasonCode::R002_STATE_EXTENDED,
        RepState::Contracted => ReasonCode::R002_STATE_CONTRACTED,
    }
}

// =============================================================================
// TESTS
// =============================================================================
