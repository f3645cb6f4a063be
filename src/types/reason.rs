//! Reason codes attached to every frame output

use serde::{Deserialize, Serialize};

/// Why the engine is in its current state after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Frame intake
    // =========================================================================
    /// Engine not started or stopped, frame ignored
    R001_NOT_TRACKING,
    /// A required landmark was missing or below the visibility floor
    R001_LANDMARK_MISSING,

    // =========================================================================
    // R002: Current state (no transition this frame)
    // =========================================================================
    /// State is WAITING
    R002_STATE_WAITING,
    /// State is EXTENDED
    R002_STATE_EXTENDED,
    /// State is CONTRACTED
    R002_STATE_CONTRACTED,

    // =========================================================================
    // R004: Thresholds
    // =========================================================================
    /// Angle between the two thresholds
    R004_ANGLE_IN_DEAD_ZONE,
    /// Contracted angle seen before any extension, not counted
    R004_CONTRACTED_BEFORE_EXTENSION,

    // =========================================================================
    // R005: Transitions
    // =========================================================================
    /// Entered EXTENDED
    R005_TRANSITION_TO_EXTENDED,
    /// Entered CONTRACTED from EXTENDED, rep counted
    R005_TRANSITION_TO_CONTRACTED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_NOT_TRACKING => "R001_NOT_TRACKING",
            Self::R001_LANDMARK_MISSING => "R001_LANDMARK_MISSING",
            Self::R002_STATE_WAITING => "R002_STATE_WAITING",
            Self::R002_STATE_EXTENDED => "R002_STATE_EXTENDED",
            Self::R002_STATE_CONTRACTED => "R002_STATE_CONTRACTED",
            Self::R004_ANGLE_IN_DEAD_ZONE => "R004_ANGLE_IN_DEAD_ZONE",
            Self::R004_CONTRACTED_BEFORE_EXTENSION => "R004_CONTRACTED_BEFORE_EXTENSION",
            Self::R005_TRANSITION_TO_EXTENDED => "R005_TRANSITION_TO_EXTENDED",
            Self::R005_TRANSITION_TO_CONTRACTED => "R005_TRANSITION_TO_CONTRACTED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_NOT_TRACKING => "Not tracking - frame ignored",
            Self::R001_LANDMARK_MISSING => "Landmark missing - frame skipped",
            Self::R002_STATE_WAITING => "Waiting for full extension",
            Self::R002_STATE_EXTENDED => "Extended",
            Self::R002_STATE_CONTRACTED => "Contracted",
            Self::R004_ANGLE_IN_DEAD_ZONE => "Angle between thresholds",
            Self::R004_CONTRACTED_BEFORE_EXTENSION => "Contraction before extension - not counted",
            Self::R005_TRANSITION_TO_EXTENDED => "Entering EXTENDED state",
            Self::R005_TRANSITION_TO_CONTRACTED => "Rep completed",
        }
    }

    /// True when the frame changed the state
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            Self::R005_TRANSITION_TO_EXTENDED | Self::R005_TRANSITION_TO_CONTRACTED
        )
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
