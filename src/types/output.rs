//! Output structures for terminal display and the API

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use crate::types::{ReasonCode, RepState, Side};

/// Snapshot returned for every processed frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// State after this frame
    pub state: RepState,
    /// Last computed joint angle (degrees)
    pub angle: f64,
    /// Reps counted so far
    pub rep_count: u32,
    /// Did this frame complete a rep?
    pub rep_completed: bool,
    /// Reason for the current state
    pub reason: ReasonCode,
    /// Workout time since start (milliseconds)
    pub elapsed_ms: u64,
}

impl FrameOutput {
    /// Create new output
    pub fn new(
        state: RepState,
        angle: f64,
        rep_count: u32,
        reason: ReasonCode,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            state,
            angle,
            rep_count,
            rep_completed: reason == ReasonCode::R005_TRANSITION_TO_CONTRACTED,
            reason,
            elapsed_ms,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let line = format!(
            "{} reps={} | angle={:>5.1}° | {:<5} | {} | {}",
            self.state.emoji(),
            self.rep_count,
            self.angle,
            self.state.cue(),
            format_elapsed(self.elapsed_ms / 1000),
            self.reason.code()
        );
        line.color(self.state.color()).to_string()
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "reps={} | angle={:.1} | state={} | time={} | reason={}",
            self.rep_count,
            self.angle,
            self.state,
            format_elapsed(self.elapsed_ms / 1000),
            self.reason.code()
        )
    }
}

/// End-of-session report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub exercise_id: String,
    pub exercise_name: String,
    pub side: Side,
    pub rep_count: u32,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub elapsed_ms: u64,
    /// Workout time as m:ss
    pub elapsed: String,
}

/// Format whole seconds as `m:ss`
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
