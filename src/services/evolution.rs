//! Streak counting and avatar mood evolution.

use crate::domain::models::{AvatarMood, AvatarState, DailySnapshot, AVATAR_STATE_VERSION};

/// Count consecutive active days from the newest snapshot backwards.
pub fn compute_streak(newest_first: &[DailySnapshot]) -> u32 {
    let days = newest_first
        .iter()
        .take_while(|s| s.meaningful_events > 0)
        .count();
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Mood thresholds, checked from the top.
pub const fn mood_for(meaningful_events: u64, streak: u32) -> AvatarMood {
    if meaningful_events == 0 {
        AvatarMood::Dormant
    } else if streak >= 14 {
        AvatarMood::Radiant
    } else if streak >= 7 {
        AvatarMood::Confident
    } else if streak >= 3 {
        AvatarMood::Steady
    } else {
        AvatarMood::Curious
    }
}

/// Derive today's avatar state, carrying the avatar's name forward.
pub fn derive_avatar_state(
    previous: Option<&AvatarState>,
    snapshot: &DailySnapshot,
    streak: u32,
    day: &str,
) -> AvatarState {
    AvatarState {
        version: AVATAR_STATE_VERSION.to_string(),
        day: day.to_string(),
        mood: mood_for(snapshot.meaningful_events, streak),
        streak,
        meaningful_events: snapshot.meaningful_events,
        skills: snapshot.skills.clone(),
        last_presence: snapshot.last_presence.clone(),
        last_time_of_day: snapshot.last_time_of_day.clone(),
        name: previous.and_then(|p| p.name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(meaningful_events: u64) -> DailySnapshot {
        DailySnapshot {
            meaningful_events,
            ..DailySnapshot::default()
        }
    }

    #[test]
    fn test_streak_boundaries() {
        assert_eq!(compute_streak(&[]), 0);
        assert_eq!(compute_streak(&[snap(0), snap(4), snap(2)]), 0);
        assert_eq!(compute_streak(&[snap(1), snap(3), snap(2)]), 3);
        assert_eq!(compute_streak(&[snap(1), snap(3), snap(0), snap(2)]), 2);
    }

    #[test]
    fn test_mood_thresholds() {
        assert_eq!(mood_for(0, 30), AvatarMood::Dormant);
        assert_eq!(mood_for(1, 14), AvatarMood::Radiant);
        assert_eq!(mood_for(1, 13), AvatarMood::Confident);
        assert_eq!(mood_for(1, 7), AvatarMood::Confident);
        assert_eq!(mood_for(1, 3), AvatarMood::Steady);
        assert_eq!(mood_for(1, 2), AvatarMood::Curious);
    }

    #[test]
    fn test_name_carries_forward() {
        let mut previous = derive_avatar_state(None, &snap(2), 1, "2026-02-07");
        assert_eq!(previous.name, None);
        previous.name = Some("Pip".to_string());

        let today = derive_avatar_state(Some(&previous), &snap(0), 0, "2026-02-08");
        assert_eq!(today.name.as_deref(), Some("Pip"));
        assert_eq!(today.mood, AvatarMood::Dormant);
        assert_eq!(today.version, "v1");
        assert_eq!(today.day, "2026-02-08");
    }
}
