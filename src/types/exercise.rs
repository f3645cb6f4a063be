//! Exercise definitions: which joint to watch and where its thresholds sit

use serde::{Deserialize, Serialize};
use crate::error::ConfigurationError;
use crate::types::landmark::landmark_name;

/// Which limb to track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left limb
    #[default]
    #[serde(alias = "left")]
    #[value(alias = "left")]
    Primary,
    /// Right limb
    #[serde(alias = "right")]
    #[value(alias = "right")]
    Mirrored,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Primary => write!(f, "primary"),
            Side::Mirrored => write!(f, "mirrored"),
        }
    }
}

/// Three landmark indices forming a joint; the angle is measured at `vertex`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointTriple {
    pub proximal: usize,
    pub vertex: usize,
    pub distal: usize,
}

impl JointTriple {
    pub const fn new(proximal: usize, vertex: usize, distal: usize) -> Self {
        Self { proximal, vertex, distal }
    }

    /// Name of the vertex landmark, e.g. "left_elbow"
    pub fn joint_name(&self) -> &'static str {
        landmark_name(self.vertex).unwrap_or("unknown")
    }
}

/// Static configuration for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    /// Display name
    pub name: String,
    /// Landmarks for the primary (left) side
    pub primary: JointTriple,
    /// Landmarks for the mirrored (right) side
    pub mirrored: JointTriple,
    /// Degrees; above this the joint is fully extended
    pub extended_threshold: f64,
    /// Degrees; below this the joint is fully contracted
    pub contracted_threshold: f64,
    /// Setup hint, display only
    #[serde(default)]
    pub instructions: String,
}

impl ExerciseDefinition {
    /// Landmarks for the requested side
    pub fn joint(&self, side: Side) -> JointTriple {
        match side {
            Side::Primary => self.primary,
            Side::Mirrored => self.mirrored,
        }
    }

    /// Check the dead zone exists: contracted < extended
    pub fn validate(&self, id: &str) -> Result<(), ConfigurationError> {
        // Written so NaN thresholds fail too
        if !(self.contracted_threshold < self.extended_threshold) {
            return Err(ConfigurationError::InvalidThresholds {
                id: id.to_string(),
                contracted: self.contracted_threshold,
                extended: self.extended_threshold,
            });
        }
        Ok(())
    }
}
