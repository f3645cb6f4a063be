//! Exercise configuration table
//!
//! Stable string ids (`bicep_curl`, `squat`, ...) mapped to definitions.
//! The built-in table is static; a JSON file may add or override entries.

use lazy_static::lazy_static;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use crate::{
    CURL_CONTRACTED_THRESHOLD, DEFAULT_CONTRACTED_THRESHOLD, DEFAULT_EXTENDED_THRESHOLD,
};
use crate::error::ConfigurationError;
use crate::types::{
    ExerciseDefinition, JointTriple,
    LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST,
    RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};

const LEFT_ARM: JointTriple = JointTriple::new(LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST);
const RIGHT_ARM: JointTriple = JointTriple::new(RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST);
const LEFT_LEG: JointTriple = JointTriple::new(LEFT_HIP, LEFT_KNEE, LEFT_ANKLE);
const RIGHT_LEG: JointTriple = JointTriple::new(RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE);

lazy_static! {
    static ref BUILTIN: ExerciseTable = {
        let mut table = ExerciseTable::empty();
        table.insert("bicep_curl", ExerciseDefinition {
            name: "Bicep Curl".to_string(),
            primary: LEFT_ARM,
            mirrored: RIGHT_ARM,
            extended_threshold: DEFAULT_EXTENDED_THRESHOLD,
            contracted_threshold: CURL_CONTRACTED_THRESHOLD,
            instructions: "Stand sideways to camera. Keep elbow stationary, curl weight up fully.".to_string(),
        });
        table.insert("squat", ExerciseDefinition {
            name: "Squat".to_string(),
            primary: LEFT_LEG,
            mirrored: RIGHT_LEG,
            extended_threshold: DEFAULT_EXTENDED_THRESHOLD,
            contracted_threshold: DEFAULT_CONTRACTED_THRESHOLD,
            instructions: "Face camera. Squat down until thighs parallel to ground.".to_string(),
        });
        table.insert("shoulder_press", ExerciseDefinition {
            name: "Shoulder Press".to_string(),
            primary: LEFT_ARM,
            mirrored: RIGHT_ARM,
            extended_threshold: DEFAULT_EXTENDED_THRESHOLD,
            contracted_threshold: DEFAULT_CONTRACTED_THRESHOLD,
            instructions: "Face camera. Press weight overhead until arms fully extended.".to_string(),
        });
        table.insert("pushup", ExerciseDefinition {
            name: "Push-up".to_string(),
            primary: LEFT_ARM,
            mirrored: RIGHT_ARM,
            extended_threshold: DEFAULT_EXTENDED_THRESHOLD,
            contracted_threshold: DEFAULT_CONTRACTED_THRESHOLD,
            instructions: "Side view. Lower chest to ground, push back up.".to_string(),
        });
        table.insert("lunge", ExerciseDefinition {
            name: "Lunge".to_string(),
            primary: LEFT_LEG,
            mirrored: RIGHT_LEG,
            extended_threshold: DEFAULT_EXTENDED_THRESHOLD,
            contracted_threshold: DEFAULT_CONTRACTED_THRESHOLD,
            instructions: "Side view. Step forward and lower back knee toward ground.".to_string(),
        });
        table
    };
}

/// Exercise id → definition
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseTable {
    exercises: BTreeMap<String, ExerciseDefinition>,
}

impl Default for ExerciseTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExerciseTable {
    /// The five built-in exercises
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Table with no entries
    pub fn empty() -> Self {
        Self {
            exercises: BTreeMap::new(),
        }
    }

    /// Parse a JSON object of `id → definition`
    ///
    /// Thresholds are not checked here; an inverted definition loads and is
    /// rejected when a session tries to start with it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let exercises: BTreeMap<String, ExerciseDefinition> = serde_json::from_str(json)?;
        Ok(Self { exercises })
    }

    /// Built-ins with the entries of a JSON file layered on top
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let overrides = Self::from_json_str(&json)?;

        let mut table = Self::builtin();
        for (id, def) in overrides.exercises {
            debug!(exercise = %id, "exercise loaded from file");
            table.exercises.insert(id, def);
        }
        info!(path = %path.display(), exercises = table.len(), "exercise table loaded");
        Ok(table)
    }

    /// Add or replace an entry
    pub fn insert(&mut self, id: impl Into<String>, def: ExerciseDefinition) {
        self.exercises.insert(id.into(), def);
    }

    /// Look up an exercise
    pub fn get(&self, id: &str) -> Result<&ExerciseDefinition, ConfigurationError> {
        self.exercises
            .get(id)
            .ok_or_else(|| ConfigurationError::UnknownExercise(id.to_string()))
    }

    /// Look up and check thresholds; what `start()` needs
    pub fn resolve(&self, id: &str) -> Result<&ExerciseDefinition, ConfigurationError> {
        let def = self.get(id)?;
        def.validate(id)?;
        Ok(def)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.exercises.contains_key(id)
    }

    /// Iterate in id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExerciseDefinition)> {
        self.exercises.iter().map(|(id, def)| (id.as_str(), def))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.exercises.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::types::Side;

    #[test]
    fn test_builtin_ids() {
        let table = ExerciseTable::builtin();
        let ids: Vec<&str> = table.ids().collect();
        assert_eq!(ids, vec!["bicep_curl", "lunge", "pushup", "shoulder_press", "squat"]);
    }

    #[test]
    fn test_builtin_thresholds_all_valid() {
        let table = ExerciseTable::builtin();
        for (id, def) in table.iter() {
            assert!(def.validate(id).is_ok(), "{} has invalid thresholds", id);
        }
    }

    #[test]
    fn test_bicep_curl_definition() {
        let table = ExerciseTable::builtin();
        let curl = table.get("bicep_curl").unwrap();
        assert_eq!(curl.extended_threshold, 160.0);
        assert_eq!(curl.contracted_threshold, 50.0);
        assert_eq!(curl.joint(Side::Primary), JointTriple::new(11, 13, 15));
        assert_eq!(curl.joint(Side::Mirrored), JointTriple::new(12, 14, 16));
    }

    #[test]
    fn test_squat_uses_knee() {
        let table = ExerciseTable::builtin();
        let squat = table.get("squat").unwrap();
        assert_eq!(squat.joint(Side::Primary).joint_name(), "left_knee");
        assert_eq!(squat.contracted_threshold, 90.0);
    }

    #[test]
    fn test_unknown_exercise() {
        let table = ExerciseTable::builtin();
        match table.get("deadlift") {
            Err(ConfigurationError::UnknownExercise(id)) => assert_eq!(id, "deadlift"),
            other => panic!("expected UnknownExercise, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_rejects_inverted() {
        let mut table = ExerciseTable::builtin();
        let mut broken = table.get("squat").unwrap().clone();
        broken.contracted_threshold = 170.0;
        table.insert("broken_squat", broken);

        assert!(table.get("broken_squat").is_ok());
        assert!(matches!(
            table.resolve("broken_squat"),
            Err(ConfigurationError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "hip_hinge": {
                "name": "Hip Hinge",
                "primary": {"proximal": 11, "vertex": 23, "distal": 25},
                "mirrored": {"proximal": 12, "vertex": 24, "distal": 26},
                "extended_threshold": 165.0,
                "contracted_threshold": 100.0
            }
        }"#;
        let table = ExerciseTable::from_json_str(json).unwrap();
        let hinge = table.get("hip_hinge").unwrap();
        assert_eq!(hinge.name, "Hip Hinge");
        assert_eq!(hinge.instructions, "");
        assert_eq!(hinge.joint(Side::Primary).joint_name(), "left_hip");
    }

    #[test]
    fn test_from_json_str_malformed() {
        assert!(matches!(
            ExerciseTable::from_json_str("{\"squat\": 3}"),
            Err(ConfigurationError::Parse(_))
        ));
    }
}
