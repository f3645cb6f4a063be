//! Repify: joint-angle rep counter
//!
//! Landmark frames → geometry → hysteresis engine → rep events

pub mod core;
pub mod error;
pub mod types;

pub use error::ConfigurationError;

// =============================================================================
// DEFAULT THRESHOLDS - degrees, from the built-in exercise table
// =============================================================================

/// Angle above which a joint counts as fully extended
pub const DEFAULT_EXTENDED_THRESHOLD: f64 = 160.0;

/// Contracted threshold for curls (elbow closes much further than a squat)
pub const CURL_CONTRACTED_THRESHOLD: f64 = 50.0;

/// Contracted threshold for presses, squats, push-ups and lunges
pub const DEFAULT_CONTRACTED_THRESHOLD: f64 = 90.0;

/// Exercise selected when none is given
pub const DEFAULT_EXERCISE: &str = "bicep_curl";

// =============================================================================
// SIMULATOR DEFAULTS
// =============================================================================

/// Frames per simulated rep cycle (~3 s at 30 fps)
pub const SIM_PERIOD_FRAMES: u32 = 90;

/// Simulated frame rate
pub const SIM_FPS: u32 = 30;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
