//! Memory patterns and identity models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::daily_state::DailyState;

/// Direction of a numeric series across the history window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Declining,
    #[default]
    Stable,
}

/// One day of history as seen by the pattern analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub mood: Option<String>,
    pub stressor: Option<String>,
    pub focus: Option<String>,
    pub theme: Option<String>,
    pub energy: i64,
    pub meaning: i64,
}

impl From<&DailyState> for HistoryEntry {
    fn from(state: &DailyState) -> Self {
        Self {
            mood: Some(state.mood().to_string()),
            stressor: state.optional_topic().map(str::to_string),
            focus: Some(state.focus().to_string()),
            theme: state.optional_text().map(str::to_string),
            energy: i64::from(state.energy()),
            meaning: i64::from(state.meaning()),
        }
    }
}

/// Recurring labels and trends found in a history window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPatterns {
    pub recurring_moods: Vec<String>,
    pub recurring_stressors: Vec<String>,
    pub recurring_focus_patterns: Vec<String>,
    pub recurring_themes: Vec<String>,
    pub energy_trend: Trend,
    pub meaning_trend: Trend,
}

impl MemoryPatterns {
    /// Energy is climbing across the window.
    pub fn is_improving(&self) -> bool {
        self.energy_trend == Trend::Rising
    }

    /// Neither energy nor meaning is moving.
    pub fn is_stable(&self) -> bool {
        self.energy_trend == Trend::Stable && self.meaning_trend == Trend::Stable
    }
}

/// Rolling 30-day memory of raw states and conservative recurring labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingMemory {
    #[serde(default)]
    pub recurring_moods: Vec<String>,
    #[serde(default)]
    pub recurring_stressors: Vec<String>,
    #[serde(default)]
    pub recurring_focus_patterns: Vec<String>,
    #[serde(default)]
    pub recurring_themes: Vec<String>,
    #[serde(default)]
    pub history: Vec<DailyState>,
}

/// Category to labels, as produced by the snapshot pattern extractor.
pub type PatternSet = BTreeMap<String, Vec<String>>;

/// Categories every identity carries, even when empty.
pub const IDENTITY_CATEGORIES: [&str; 4] = [
    "recurring_moods",
    "recurring_stressors",
    "recurring_focus_patterns",
    "recurring_themes",
];

/// Crystallized long-lived identity of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Promoted labels per category.
    #[serde(flatten)]
    pub traits: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub confidence: BTreeMap<String, f64>,
    #[serde(default)]
    pub evidence: BTreeMap<String, u32>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl Identity {
    /// Identity of a user with no history yet.
    pub fn empty() -> Self {
        Self {
            traits: IDENTITY_CATEGORIES
                .iter()
                .map(|c| ((*c).to_string(), Vec::new()))
                .collect(),
            confidence: BTreeMap::new(),
            evidence: BTreeMap::new(),
            last_updated: None,
        }
    }

    pub fn labels(&self, category: &str) -> &[String] {
        self.traits.get(category).map_or(&[], Vec::as_slice)
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_entry_from_state() {
        let state = DailyState::builder("2026-02-08")
            .mood(7)
            .focus(4)
            .topic("deadline")
            .build()
            .unwrap();
        let entry = HistoryEntry::from(&state);
        assert_eq!(entry.mood.as_deref(), Some("7"));
        assert_eq!(entry.focus.as_deref(), Some("4"));
        assert_eq!(entry.stressor.as_deref(), Some("deadline"));
        assert_eq!(entry.theme, None);
    }

    #[test]
    fn test_empty_identity_shape() {
        let value = serde_json::to_value(Identity::empty()).unwrap();
        assert_eq!(
            value,
            json!({
                "recurring_moods": [],
                "recurring_stressors": [],
                "recurring_focus_patterns": [],
                "recurring_themes": [],
                "confidence": {},
                "evidence": {},
                "last_updated": null
            })
        );
    }

    #[test]
    fn test_identity_reads_flattened_categories() {
        let identity: Identity = serde_json::from_value(json!({
            "recurring_moods": ["steady"],
            "confidence": {"recurring_moods:steady": 3.0},
            "evidence": {"recurring_moods:steady": 3},
            "last_updated": "2026-02-08"
        }))
        .unwrap();
        assert_eq!(identity.labels("recurring_moods"), ["steady".to_string()]);
        assert!(identity.labels("recurring_themes").is_empty());
    }
}
