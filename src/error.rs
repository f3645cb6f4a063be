//! Configuration errors
//!
//! The only failure the engine reports. Missing landmarks and degenerate
//! geometry are handled in-band and never reach this type.

use thiserror::Error;

/// Raised when selecting or loading exercise configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Exercise id not present in the table
    #[error("unknown exercise '{0}'")]
    UnknownExercise(String),

    /// Thresholds leave no dead zone, so the machine could never progress
    #[error(
        "exercise '{id}': contracted threshold {contracted}° must be below extended threshold {extended}°"
    )]
    InvalidThresholds {
        id: String,
        contracted: f64,
        extended: f64,
    },

    /// Exercise table file could not be read
    #[error("cannot read exercise table '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Exercise table file is not valid JSON for the table schema
    #[error("invalid exercise table: {0}")]
    Parse(#[from] serde_json::Error),
}
