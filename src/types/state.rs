//! Rep state definitions

use colored::Color;
use serde::{Deserialize, Serialize};

/// The three states of the hysteresis machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepState {
    /// Session start/reset, no full extension seen yet
    Waiting,
    /// Joint opened past the extended threshold
    Extended,
    /// Joint closed past the contracted threshold after an extension
    Contracted,
}

impl RepState {
    /// Terminal color for this state
    pub fn color(&self) -> Color {
        match self {
            RepState::Waiting => Color::BrightBlack,
            RepState::Extended => Color::Yellow,
            RepState::Contracted => Color::Green,
        }
    }

    /// Get emoji for state
    pub fn emoji(&self) -> &'static str {
        match self {
            RepState::Waiting => "⏳",
            RepState::Extended => "⬇️",
            RepState::Contracted => "💪",
        }
    }

    /// Short cue shown to the athlete
    pub fn cue(&self) -> &'static str {
        match self {
            RepState::Waiting => "Ready",
            RepState::Extended => "DOWN",
            RepState::Contracted => "UP!",
        }
    }
}

impl std::fmt::Display for RepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RepState::Waiting => "WAITING",
            RepState::Extended => "EXTENDED",
            RepState::Contracted => "CONTRACTED",
        };
        write!(f, "{}", name)
    }
}
