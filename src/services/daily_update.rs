//! The pure end-of-day fold: snapshot, streak, avatar, patterns, identity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::evolution::{compute_streak, derive_avatar_state};
use super::identity_crystallizer::crystallize;
use super::pattern_engine::{extract_patterns, SnapshotWindowEntry};
use super::snapshot_builder::build_daily_snapshot;
use crate::domain::models::{AvatarState, DailySnapshot, Identity, PatternSet, SessionEvent};
use crate::domain::ports::PromptBundle;

/// Previous days considered when counting the streak.
pub const STREAK_WINDOW_DAYS: usize = 60;
/// Previous days considered when extracting patterns.
pub const PATTERN_WINDOW_DAYS: usize = 13;

/// Everything derived for one user-day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUpdate {
    pub day: String,
    pub snapshot: DailySnapshot,
    pub streak: u32,
    pub avatar_state: AvatarState,
    pub patterns: PatternSet,
    pub identity: Identity,
}

/// Fold one day's events into the derived state.
///
/// `previous` holds stored snapshots for earlier days, newest first. Today's
/// snapshot is built from `events` and placed in front of both windows.
/// Every pattern-window entry is judged against today's avatar state.
pub fn run_daily_update(
    day: &str,
    events: &[SessionEvent],
    previous: &[DailySnapshot],
    previous_avatar: Option<&AvatarState>,
    identity: &Identity,
) -> DailyUpdate {
    let snapshot = build_daily_snapshot(events);

    let streak_window: Vec<DailySnapshot> = std::iter::once(snapshot.clone())
        .chain(previous.iter().take(STREAK_WINDOW_DAYS).cloned())
        .collect();
    let streak = compute_streak(&streak_window);

    let avatar_state = derive_avatar_state(previous_avatar, &snapshot, streak, day);

    let pattern_window: Vec<SnapshotWindowEntry<'_>> = streak_window
        .iter()
        .take(PATTERN_WINDOW_DAYS + 1)
        .map(|s| SnapshotWindowEntry {
            snapshot: s,
            avatar_state: &avatar_state,
        })
        .collect();
    let patterns = extract_patterns(&pattern_window);

    let identity = crystallize(identity, &patterns, day);

    DailyUpdate {
        day: day.to_string(),
        snapshot,
        streak,
        avatar_state,
        patterns,
        identity,
    }
}

/// Image prompt for an avatar state.
///
/// Uses the strongest skill (ties broken by name), the last seen time of day
/// and the energy level of the last presence.
pub fn avatar_description(state: &AvatarState) -> String {
    let top_skill = state
        .skills
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map_or("personal", |(name, _)| name.as_str());
    let time_of_day = state.last_time_of_day.as_deref().unwrap_or("day");
    let energy = state
        .last_presence
        .as_ref()
        .and_then(|p| p.get("energy_level").or_else(|| p.get("energy")))
        .and_then(Value::as_str)
        .unwrap_or("medium");

    format!(
        "A calm symbolic avatar representing a {time_of_day} mood, {energy} energy, \
         focused on {top_skill} growth, minimalist, soft lighting, no face, abstract, \
         reflective, life OS assistant"
    )
}

/// Prompt asking for a short reflection on the day.
pub fn build_reflection_prompt(
    bundle: &PromptBundle,
    snapshot: &DailySnapshot,
    avatar: &AvatarState,
) -> String {
    let mut sections: Vec<String> = [&bundle.identity, &bundle.purpose, &bundle.style_rules]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let skills = snapshot
        .skills
        .iter()
        .map(|(name, level)| format!("{name} {level}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut today = vec![
        format!("Day: {}", avatar.day),
        format!("Avatar mood: {} (streak {} days)", avatar.mood, avatar.streak),
        format!("Meaningful events: {}", snapshot.meaningful_events),
        format!("Skills: {skills}"),
    ];
    if let Some(time_of_day) = &snapshot.last_time_of_day {
        today.push(format!("Time of day: {time_of_day}"));
    }
    if let Some(state) = snapshot
        .last_presence
        .as_ref()
        .and_then(|p| p.get("state"))
        .and_then(Value::as_str)
    {
        today.push(format!("Last presence: {state}"));
    }
    sections.push(today.join("\n"));
    sections.push("Write a short, gentle reflection on this day.".to_string());

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{default_skills, AvatarMood, EventType, AVATAR_STATE_VERSION};
    use serde_json::json;

    fn event(index: u64, event_type: EventType) -> SessionEvent {
        SessionEvent {
            id: format!("e{index}"),
            session_id: "s1".to_string(),
            timestamp: "2026-02-08T12:00:00Z".to_string(),
            event_index: index,
            event_type,
            payload: json!({"time_of_day": "evening", "state": "AWAKE"}),
            source: "test".to_string(),
            event_hash: None,
            prev_hash: None,
        }
    }

    fn active(meaningful: u64) -> DailySnapshot {
        DailySnapshot {
            meaningful_events: meaningful,
            ..DailySnapshot::default()
        }
    }

    #[test]
    fn test_quiet_day_is_dormant() {
        let update = run_daily_update("2026-02-08", &[], &[active(3)], None, &Identity::empty());
        assert_eq!(update.streak, 0);
        assert_eq!(update.avatar_state.mood, AvatarMood::Dormant);
        assert_eq!(update.patterns["recurring_moods"], vec!["dormant".to_string()]);
        assert_eq!(update.identity.last_updated.as_deref(), Some("2026-02-08"));
    }

    #[test]
    fn test_streak_includes_today() {
        let events = [event(1, EventType::Presence), event(2, EventType::TimeOfDay)];
        let previous = [active(1), active(2), active(0), active(5)];
        let update = run_daily_update("2026-02-08", &events, &previous, None, &Identity::empty());
        assert_eq!(update.snapshot.meaningful_events, 2);
        assert_eq!(update.streak, 3);
        assert_eq!(update.avatar_state.mood, AvatarMood::Steady);
        assert_eq!(update.avatar_state.last_time_of_day.as_deref(), Some("evening"));
    }

    #[test]
    fn test_pattern_window_is_bounded() {
        // 20 idle previous days; only 13 of them join today in the pattern window.
        let previous = vec![active(0); 20];
        let events = [event(1, EventType::Heartbeat)];
        let update = run_daily_update("2026-02-08", &events, &previous, None, &Identity::empty());
        assert_eq!(
            update.patterns["recurring_stressors"],
            vec!["low_activity_cycles".to_string()]
        );
        assert_eq!(update.identity.evidence["recurring_stressors:low_activity_cycles"], 1);
    }

    #[test]
    fn test_same_inputs_same_update() {
        let events = [event(1, EventType::Skills), event(2, EventType::Presence)];
        let a = run_daily_update("2026-02-08", &events, &[active(2)], None, &Identity::empty());
        let b = run_daily_update("2026-02-08", &events, &[active(2)], None, &Identity::empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_reflection_prompt_sections() {
        let update = run_daily_update(
            "2026-02-08",
            &[event(1, EventType::Presence)],
            &[],
            None,
            &Identity::empty(),
        );
        let bundle = PromptBundle {
            identity: "You are a calm companion.\n".to_string(),
            purpose: "  ".to_string(),
            style_rules: "Be brief.".to_string(),
            ..PromptBundle::default()
        };
        let prompt = build_reflection_prompt(&bundle, &update.snapshot, &update.avatar_state);
        assert!(prompt.starts_with("You are a calm companion.\n\nBe brief.\n\nDay: 2026-02-08"));
        assert!(prompt.contains("Avatar mood: curious (streak 1 days)"));
        assert!(prompt.contains("Last presence: AWAKE"));
        assert!(prompt.ends_with("Write a short, gentle reflection on this day."));
    }

    fn state() -> AvatarState {
        AvatarState {
            version: AVATAR_STATE_VERSION.to_string(),
            day: "2026-02-08".to_string(),
            mood: AvatarMood::Steady,
            streak: 3,
            meaningful_events: 4,
            skills: default_skills(),
            last_presence: Some(json!({"state": "AWAKE", "energy": "high"})),
            last_time_of_day: Some("evening".to_string()),
            name: None,
        }
    }

    #[test]
    fn test_description_uses_top_skill() {
        let text = avatar_description(&state());
        assert!(text.starts_with("A calm symbolic avatar representing a evening mood, high energy"));
        assert!(text.contains("focused on focus growth"));
    }

    #[test]
    fn test_description_defaults() {
        let mut s = state();
        s.skills.clear();
        s.last_presence = None;
        s.last_time_of_day = None;
        let text = avatar_description(&s);
        assert!(text.contains("a day mood, medium energy"));
        assert!(text.contains("focused on personal growth"));
    }
}
