//! Landmarks delivered by the pose source
//!
//! Indices follow MediaPipe Pose (33 landmarks). The engine only ever reads
//! the three indices named by the active exercise.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// LANDMARK INDICES (MediaPipe Pose - 33 total)
// =============================================================================

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Total landmarks produced per frame
pub const LANDMARK_COUNT: usize = 33;

const LANDMARK_NAMES: [&str; LANDMARK_COUNT] = [
    "nose",
    "left_eye_inner",
    "left_eye",
    "left_eye_outer",
    "right_eye_inner",
    "right_eye",
    "right_eye_outer",
    "left_ear",
    "right_ear",
    "mouth_left",
    "mouth_right",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_pinky",
    "right_pinky",
    "left_index",
    "right_index",
    "left_thumb",
    "right_thumb",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
    "left_heel",
    "right_heel",
    "left_foot_index",
    "right_foot_index",
];

/// Human-readable name for a landmark index
pub fn landmark_name(index: usize) -> Option<&'static str> {
    LANDMARK_NAMES.get(index).copied()
}

// =============================================================================
// POINT
// =============================================================================

/// A 2D landmark position with optional confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Point2D {
    /// Point without a confidence score
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, visibility: None }
    }

    /// Point with a confidence score
    pub fn with_visibility(x: f64, y: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            visibility: Some(visibility),
        }
    }
}

// =============================================================================
// LANDMARK SET
// =============================================================================

/// Wire shapes accepted for a landmark set
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkInput {
    /// `[{x,y}, null, ...]` - position is the index, null is missing
    List(Vec<Option<Point2D>>),
    /// `{"11": {x,y}, ...}`
    Map(BTreeMap<String, Point2D>),
}

/// All landmarks observed in one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LandmarkInput")]
pub struct LandmarkSet(BTreeMap<usize, Point2D>);

impl LandmarkSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a landmark
    pub fn insert(&mut self, index: usize, point: Point2D) {
        self.0.insert(index, point);
    }

    /// Builder form of `insert`
    pub fn with(mut self, index: usize, point: Point2D) -> Self {
        self.insert(index, point);
        self
    }

    /// Drop a landmark (sensor dropout)
    pub fn remove(&mut self, index: usize) -> Option<Point2D> {
        self.0.remove(&index)
    }

    /// Look up a landmark
    pub fn get(&self, index: usize) -> Option<&Point2D> {
        self.0.get(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate (index, point) in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Point2D)> {
        self.0.iter().map(|(i, p)| (*i, p))
    }
}

impl TryFrom<LandmarkInput> for LandmarkSet {
    type Error = String;

    fn try_from(input: LandmarkInput) -> Result<Self, Self::Error> {
        let map = match input {
            LandmarkInput::List(points) => points
                .into_iter()
                .enumerate()
                .filter_map(|(i, p)| p.map(|p| (i, p)))
                .collect(),
            LandmarkInput::Map(entries) => entries
                .into_iter()
                .map(|(key, p)| {
                    key.trim()
                        .parse::<usize>()
                        .map(|i| (i, p))
                        .map_err(|_| format!("landmark key '{}' is not an index", key))
                })
                .collect::<Result<_, _>>()?,
        };
        Ok(Self(map))
    }
}

impl FromIterator<(usize, Point2D)> for LandmarkSet {
    fn from_iter<T: IntoIterator<Item = (usize, Point2D)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_form() {
        let json = r#"[{"x": 0.1, "y": 0.2}, null, {"x": 0.5, "y": 0.6, "z": -0.3, "visibility": 0.9}]"#;
        let set: LandmarkSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.get(1).is_none());
        assert_eq!(set.get(2).unwrap().visibility, Some(0.9));
    }

    #[test]
    fn test_parse_map_form() {
        let json = r#"{"11": {"x": 0.4, "y": 0.3}, "13": {"x": 0.35, "y": 0.5}}"#;
        let set: LandmarkSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.get(LEFT_SHOULDER), Some(&Point2D::new(0.4, 0.3)));
        assert_eq!(set.get(LEFT_ELBOW), Some(&Point2D::new(0.35, 0.5)));
        assert!(set.get(LEFT_WRIST).is_none());
    }

    #[test]
    fn test_map_form_rejects_named_keys() {
        let json = r#"{"elbow": {"x": 0.35, "y": 0.5}}"#;
        assert!(serde_json::from_str::<LandmarkSet>(json).is_err());
    }

    #[test]
    fn test_serialized_set_parses_back() {
        let set = LandmarkSet::new()
            .with(LEFT_HIP, Point2D::new(0.5, 0.5))
            .with(LEFT_KNEE, Point2D::with_visibility(0.5, 0.7, 0.8));

        let json = serde_json::to_string(&set).unwrap();
        let parsed: LandmarkSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_landmark_names() {
        assert_eq!(landmark_name(LEFT_ELBOW), Some("left_elbow"));
        assert_eq!(landmark_name(RIGHT_ANKLE), Some("right_ankle"));
        assert_eq!(landmark_name(LANDMARK_COUNT), None);
    }
}
