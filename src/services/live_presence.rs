//! Live presence and skills derived from a session's logged actions.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Timelike, Utc};

use crate::domain::models::{default_skills, Action, ActionType, LivePresence, LiveState, TimeOfDay};

/// Only the most recent actions influence presence.
pub const PRESENCE_ACTION_WINDOW: usize = 10;

const DEFAULT_SCORE: f64 = 50.0;
const CALM_BELOW: f64 = 40.0;

/// Pure: the same actions and instant give the same presence.
pub fn derive_presence(actions: &[Action], now: DateTime<Utc>) -> LivePresence {
    let time_of_day = TimeOfDay::from_hour(now.hour());

    let mut focus = DEFAULT_SCORE;
    let mut mood = DEFAULT_SCORE;
    let start = actions.len().saturating_sub(PRESENCE_ACTION_WINDOW);
    for action in &actions[start..] {
        match (action.action_type, action.value) {
            (ActionType::LogFocus, Some(v)) => focus = v,
            (ActionType::LogMood, Some(v)) => mood = v,
            _ => {}
        }
    }

    let (state, energy) = if time_of_day == TimeOfDay::Night {
        (LiveState::Sleeping, "low")
    } else if mood < CALM_BELOW {
        (LiveState::Calm, "low")
    } else {
        (LiveState::Awake, "medium")
    };

    LivePresence {
        state,
        energy: energy.to_string(),
        focus,
        mood,
        time_of_day,
        ts: now.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    }
}

/// Default skill levels overridden by the latest logged focus, health and financial values.
#[allow(clippy::cast_possible_truncation)]
pub fn derive_skills(actions: &[Action]) -> BTreeMap<String, i64> {
    let mut skills = default_skills();
    for action in actions {
        let skill = match action.action_type {
            ActionType::LogFocus => "focus",
            ActionType::LogHealth => "health",
            ActionType::LogFinancial => "financial",
            ActionType::CheckIn | ActionType::LogMood => continue,
        };
        if let Some(value) = action.value {
            skills.insert(skill.to_string(), value.clamp(0.0, 100.0).round() as i64);
        }
    }
    skills
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 8, hour, 30, 0).unwrap()
    }

    fn action(action_type: ActionType, value: Option<f64>) -> Action {
        Action {
            action_type,
            value,
            note: None,
            ts: "2026-02-08T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let presence = derive_presence(&[], at(9));
        assert_eq!(presence.state, LiveState::Awake);
        assert_eq!(presence.energy, "medium");
        assert!((presence.mood - 50.0).abs() < f64::EPSILON);
        assert!((presence.focus - 50.0).abs() < f64::EPSILON);
        assert_eq!(presence.time_of_day, TimeOfDay::Morning);
        assert_eq!(presence.ts, "2026-02-08T09:30:00Z");
    }

    #[test]
    fn test_night_sleeps() {
        let presence = derive_presence(&[action(ActionType::LogMood, Some(90.0))], at(23));
        assert_eq!(presence.state, LiveState::Sleeping);
        assert_eq!(presence.energy, "low");
    }

    #[test]
    fn test_low_mood_is_calm() {
        let actions = [
            action(ActionType::LogMood, Some(30.0)),
            action(ActionType::LogFocus, Some(70.0)),
            action(ActionType::LogMood, None),
        ];
        let presence = derive_presence(&actions, at(14));
        assert_eq!(presence.state, LiveState::Calm);
        assert_eq!(presence.energy, "low");
        assert!((presence.focus - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_only_last_ten_actions_count() {
        let mut actions = vec![action(ActionType::LogMood, Some(10.0))];
        actions.extend((0..10).map(|_| action(ActionType::CheckIn, None)));
        let presence = derive_presence(&actions, at(14));
        assert_eq!(presence.state, LiveState::Awake);
        assert!((presence.mood - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skills_follow_latest_values() {
        let skills = derive_skills(&[
            action(ActionType::LogHealth, Some(40.4)),
            action(ActionType::LogHealth, Some(55.6)),
            action(ActionType::LogFinancial, Some(140.0)),
            action(ActionType::LogMood, Some(5.0)),
        ]);
        assert_eq!(skills["health"], 56);
        assert_eq!(skills["financial"], 100);
        assert_eq!(skills["focus"], 90);
        assert_eq!(skills["relationships"], 60);
    }
}
