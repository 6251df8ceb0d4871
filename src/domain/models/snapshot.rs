//! Daily snapshot and avatar state models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Skill levels used until a day publishes its own.
pub fn default_skills() -> BTreeMap<String, i64> {
    [
        ("financial", 80),
        ("health", 70),
        ("focus", 90),
        ("relationships", 60),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// One day's journal folded into counts and last-seen states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub counts: BTreeMap<String, u64>,
    pub last_presence: Option<Value>,
    pub last_time_of_day: Option<String>,
    pub skills: BTreeMap<String, i64>,
    pub meaningful_events: u64,
}

impl Default for DailySnapshot {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
            last_presence: None,
            last_time_of_day: None,
            skills: default_skills(),
            meaningful_events: 0,
        }
    }
}

/// Coarse avatar mood derived from streak and activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarMood {
    Dormant,
    Curious,
    Steady,
    Confident,
    Radiant,
}

impl AvatarMood {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dormant => "dormant",
            Self::Curious => "curious",
            Self::Steady => "steady",
            Self::Confident => "confident",
            Self::Radiant => "radiant",
        }
    }
}

impl fmt::Display for AvatarMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted avatar state for one user-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarState {
    pub version: String,
    pub day: String,
    pub mood: AvatarMood,
    pub streak: u32,
    pub meaningful_events: u64,
    pub skills: BTreeMap<String, i64>,
    pub last_presence: Option<Value>,
    pub last_time_of_day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Current avatar state schema tag.
pub const AVATAR_STATE_VERSION: &str = "v1";
