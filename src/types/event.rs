//! Rep-completed notification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::Side;

/// Fired synchronously from `process_frame` on each counted rep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepCompleted {
    pub exercise_id: String,
    pub side: Side,
    /// Count after this rep
    pub rep_count: u32,
    /// Angle that crossed the contracted threshold
    pub angle: f64,
    pub timestamp: DateTime<Utc>,
}
