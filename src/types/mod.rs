//! Core types for Repify

mod state;
mod landmark;
mod exercise;
mod output;
mod reason;
mod event;

pub use state::RepState;
pub use landmark::{
    Point2D, LandmarkSet, landmark_name, LANDMARK_COUNT,
    NOSE, LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_ELBOW, RIGHT_ELBOW,
    LEFT_WRIST, RIGHT_WRIST, LEFT_HIP, RIGHT_HIP,
    LEFT_KNEE, RIGHT_KNEE, LEFT_ANKLE, RIGHT_ANKLE,
};
pub use exercise::{Side, JointTriple, ExerciseDefinition};
pub use output::{FrameOutput, SessionSummary, format_elapsed};
pub use reason::ReasonCode;
pub use event::RepCompleted;
