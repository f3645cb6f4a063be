//! Core modules for Repify

pub mod geometry;
pub mod exercises;
pub mod engine;
pub mod simulator;
pub mod api;

pub use geometry::joint_angle;
pub use exercises::ExerciseTable;
pub use engine::{RepEngine, RepSession, EngineConfig, RepListener};
pub use simulator::SimulatedPose;
pub use api::{create_router, router_with_state, run_server, ApiError, AppState, SessionUpdate};
