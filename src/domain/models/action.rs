//! User actions logged during a live session and the presence derived from them.

use serde::{Deserialize, Serialize};

/// Kinds of action a user can log against a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    CheckIn,
    LogMood,
    LogFocus,
    LogHealth,
    LogFinancial,
}

/// A single logged action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
    pub ts: String,
}

/// Overall avatar state shown in the live view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LiveState {
    Awake,
    Calm,
    Sleeping,
}

/// Time-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket an hour of the day (0-23).
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=21 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

/// Presence snapshot emitted on the live stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePresence {
    pub state: LiveState,
    pub energy: String,
    pub focus: f64,
    pub mood: f64,
    pub time_of_day: TimeOfDay,
    pub ts: String,
}
