//! Snapshot-window pattern extraction feeding identity crystallization.

use std::collections::HashMap;

use crate::domain::models::{AvatarState, DailySnapshot, PatternSet};

/// Zero-activity days needed before low activity counts as a stressor.
const LOW_ACTIVITY_DAYS: usize = 3;
/// Total meaningful events across the window that signal steady progress.
const PROGRESS_EVENTS: u64 = 10;

/// A snapshot paired with the avatar state it is judged against.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotWindowEntry<'a> {
    pub snapshot: &'a DailySnapshot,
    pub avatar_state: &'a AvatarState,
}

/// Extract category labels from a window of recent days, today first.
pub fn extract_patterns(window: &[SnapshotWindowEntry<'_>]) -> PatternSet {
    let mut patterns = PatternSet::new();
    if window.is_empty() {
        return patterns;
    }

    let moods = top_moods(window);
    if !moods.is_empty() {
        patterns.insert("recurring_moods".to_string(), moods);
    }

    let idle_days = window
        .iter()
        .filter(|e| e.snapshot.meaningful_events == 0)
        .count();
    if idle_days >= LOW_ACTIVITY_DAYS {
        patterns.insert(
            "recurring_stressors".to_string(),
            vec!["low_activity_cycles".to_string()],
        );
    }

    let focus: Vec<i64> = window
        .iter()
        .filter_map(|e| e.snapshot.skills.get("focus").copied())
        .collect();
    if !focus.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let mean = focus.iter().sum::<i64>() as f64 / focus.len() as f64;
        if mean >= 80.0 {
            patterns.insert(
                "recurring_focus_patterns".to_string(),
                vec!["high_focus_baseline".to_string()],
            );
        } else if mean <= 50.0 {
            patterns.insert(
                "recurring_focus_patterns".to_string(),
                vec!["low_focus_baseline".to_string()],
            );
        }
    }

    let total: u64 = window.iter().map(|e| e.snapshot.meaningful_events).sum();
    if total >= PROGRESS_EVENTS {
        patterns.insert(
            "recurring_themes".to_string(),
            vec!["consistent_progress".to_string()],
        );
    }

    patterns
}

/// Two most frequent avatar moods, ties broken by name.
fn top_moods(window: &[SnapshotWindowEntry<'_>]) -> Vec<String> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for entry in window {
        *counts.entry(entry.avatar_state.mood.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(2)
        .map(|(mood, _)| mood.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{default_skills, AvatarMood, AVATAR_STATE_VERSION};
    use std::collections::BTreeMap;

    fn avatar(mood: AvatarMood) -> AvatarState {
        AvatarState {
            version: AVATAR_STATE_VERSION.to_string(),
            day: "2026-02-08".to_string(),
            mood,
            streak: 0,
            meaningful_events: 0,
            skills: BTreeMap::new(),
            last_presence: None,
            last_time_of_day: None,
            name: None,
        }
    }

    fn snapshot(meaningful: u64, focus: i64) -> DailySnapshot {
        let mut skills = default_skills();
        skills.insert("focus".to_string(), focus);
        DailySnapshot {
            meaningful_events: meaningful,
            skills,
            ..DailySnapshot::default()
        }
    }

    #[test]
    fn test_empty_window() {
        assert!(extract_patterns(&[]).is_empty());
    }

    #[test]
    fn test_low_activity_and_low_focus() {
        let state = avatar(AvatarMood::Dormant);
        let snaps: Vec<_> = (0..3).map(|_| snapshot(0, 40)).collect();
        let window: Vec<_> = snaps
            .iter()
            .map(|s| SnapshotWindowEntry { snapshot: s, avatar_state: &state })
            .collect();
        let patterns = extract_patterns(&window);
        assert_eq!(patterns["recurring_moods"], vec!["dormant".to_string()]);
        assert_eq!(patterns["recurring_stressors"], vec!["low_activity_cycles".to_string()]);
        assert_eq!(patterns["recurring_focus_patterns"], vec!["low_focus_baseline".to_string()]);
        assert!(!patterns.contains_key("recurring_themes"));
    }

    #[test]
    fn test_progress_and_high_focus() {
        let state = avatar(AvatarMood::Steady);
        let snaps = [snapshot(6, 90), snapshot(4, 85)];
        let window: Vec<_> = snaps
            .iter()
            .map(|s| SnapshotWindowEntry { snapshot: s, avatar_state: &state })
            .collect();
        let patterns = extract_patterns(&window);
        assert_eq!(patterns["recurring_themes"], vec!["consistent_progress".to_string()]);
        assert_eq!(patterns["recurring_focus_patterns"], vec!["high_focus_baseline".to_string()]);
        assert!(!patterns.contains_key("recurring_stressors"));
    }

    #[test]
    fn test_mid_focus_has_no_baseline() {
        let state = avatar(AvatarMood::Curious);
        let snap = snapshot(1, 65);
        let patterns = extract_patterns(&[SnapshotWindowEntry { snapshot: &snap, avatar_state: &state }]);
        assert!(!patterns.contains_key("recurring_focus_patterns"));
    }

    #[test]
    fn test_top_moods_tie_break_by_name() {
        let radiant = avatar(AvatarMood::Radiant);
        let curious = avatar(AvatarMood::Curious);
        let steady = avatar(AvatarMood::Steady);
        let snap = snapshot(1, 70);
        let window = [
            SnapshotWindowEntry { snapshot: &snap, avatar_state: &radiant },
            SnapshotWindowEntry { snapshot: &snap, avatar_state: &steady },
            SnapshotWindowEntry { snapshot: &snap, avatar_state: &curious },
            SnapshotWindowEntry { snapshot: &snap, avatar_state: &steady },
        ];
        assert_eq!(top_moods(&window), vec!["steady".to_string(), "curious".to_string()]);
    }
}
