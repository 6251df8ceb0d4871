//! Recurring-label and trend detection over a history window.

use std::collections::HashMap;

use crate::domain::models::{DailyState, HistoryEntry, MemoryPatterns, RollingMemory, Trend};

/// Days kept in the rolling memory.
pub const ROLLING_WINDOW_DAYS: usize = 30;

/// Minimum occurrences for a label to recur in the rolling memory.
const ROLLING_THRESHOLD: usize = 3;

/// Analyze a newest-last history window.
///
/// Windows shorter than three days carry too little signal and yield empty
/// lists with stable trends. Longer windows raise the bar for recurrence: a
/// label must appear 3 times in a window under 5 days, 5 times under 7, and
/// 7 times otherwise.
pub fn analyze_memory_patterns(history: &[HistoryEntry]) -> MemoryPatterns {
    if history.len() < 3 {
        return MemoryPatterns::default();
    }

    let threshold = match history.len() {
        n if n < 5 => 3,
        n if n < 7 => 5,
        _ => 7,
    };
    let recurring = |pick: fn(&HistoryEntry) -> Option<&str>| {
        recurring_labels(history.iter().filter_map(pick), threshold)
    };

    MemoryPatterns {
        recurring_moods: recurring(|e| e.mood.as_deref()),
        recurring_stressors: recurring(|e| e.stressor.as_deref()),
        recurring_focus_patterns: recurring(|e| e.focus.as_deref()),
        recurring_themes: recurring(|e| e.theme.as_deref()),
        energy_trend: trend(&history.iter().map(|e| e.energy).collect::<Vec<_>>()),
        meaning_trend: trend(&history.iter().map(|e| e.meaning).collect::<Vec<_>>()),
    }
}

/// Append today's state to the rolling memory and recount conservatively.
pub fn update_memory(previous: &RollingMemory, today: &DailyState) -> RollingMemory {
    let mut history = previous.history.clone();
    history.push(today.clone());
    if history.len() > ROLLING_WINDOW_DAYS {
        history.drain(..history.len() - ROLLING_WINDOW_DAYS);
    }

    let moods: Vec<String> = history.iter().map(|d| d.mood().to_string()).collect();
    let focus: Vec<String> = history.iter().map(|d| d.focus().to_string()).collect();

    RollingMemory {
        recurring_moods: recurring_labels(moods.iter().map(String::as_str), ROLLING_THRESHOLD),
        recurring_stressors: recurring_labels(
            history.iter().filter_map(DailyState::optional_topic),
            ROLLING_THRESHOLD,
        ),
        recurring_focus_patterns: recurring_labels(
            focus.iter().map(String::as_str),
            ROLLING_THRESHOLD,
        ),
        recurring_themes: recurring_labels(
            history.iter().filter_map(DailyState::optional_text),
            ROLLING_THRESHOLD,
        ),
        history,
    }
}

/// Labels seen at least `threshold` times, in order of first appearance.
fn recurring_labels<'a>(labels: impl Iterator<Item = &'a str>, threshold: usize) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        let count = counts.entry(label).or_insert(0);
        if *count == 0 {
            order.push(label);
        }
        *count += 1;
    }
    order
        .into_iter()
        .filter(|label| counts[label] >= threshold)
        .map(str::to_string)
        .collect()
}

fn trend(values: &[i64]) -> Trend {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) if values.len() >= 2 => {
            if values.iter().all(|v| v == first) {
                Trend::Stable
            } else if last > first {
                Trend::Rising
            } else if last < first {
                Trend::Declining
            } else {
                Trend::Stable
            }
        }
        _ => Trend::Stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mood: &str, stressor: Option<&str>, energy: i64, meaning: i64) -> HistoryEntry {
        HistoryEntry {
            mood: Some(mood.to_string()),
            stressor: stressor.map(str::to_string),
            focus: None,
            theme: None,
            energy,
            meaning,
        }
    }

    #[test]
    fn test_short_history_is_empty_and_stable() {
        let history = vec![entry("low", Some("work"), 2, 9), entry("low", Some("work"), 8, 1)];
        assert_eq!(analyze_memory_patterns(&history), MemoryPatterns::default());
        assert_eq!(analyze_memory_patterns(&[]), MemoryPatterns::default());
    }

    #[test]
    fn test_three_day_window_threshold() {
        let history = vec![
            entry("low", Some("work"), 3, 5),
            entry("low", Some("family"), 4, 5),
            entry("low", Some("work"), 6, 5),
        ];
        let patterns = analyze_memory_patterns(&history);
        assert_eq!(patterns.recurring_moods, vec!["low".to_string()]);
        assert!(patterns.recurring_stressors.is_empty());
        assert_eq!(patterns.energy_trend, Trend::Rising);
        assert_eq!(patterns.meaning_trend, Trend::Stable);
    }

    #[test]
    fn test_threshold_scales_with_window() {
        // Five days: label must appear five times.
        let mut history: Vec<_> = (0..4).map(|_| entry("calm", None, 5, 8)).collect();
        history.push(entry("tense", None, 5, 2));
        let patterns = analyze_memory_patterns(&history);
        assert!(patterns.recurring_moods.is_empty());
        assert_eq!(patterns.meaning_trend, Trend::Declining);

        // Seven days: seven occurrences needed.
        let history: Vec<_> = (0..7).map(|_| entry("calm", None, 5, 5)).collect();
        assert_eq!(analyze_memory_patterns(&history).recurring_moods, vec!["calm".to_string()]);
    }

    #[test]
    fn test_first_appearance_order() {
        let history = vec![
            entry("b", None, 1, 1),
            entry("a", None, 1, 1),
            entry("b", None, 1, 1),
            entry("a", None, 1, 1),
        ];
        let labels = recurring_labels(history.iter().filter_map(|e| e.mood.as_deref()), 2);
        assert_eq!(labels, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_equal_endpoints_are_stable() {
        assert_eq!(trend(&[5, 9, 5]), Trend::Stable);
        assert_eq!(trend(&[7]), Trend::Stable);
        assert_eq!(trend(&[7, 3]), Trend::Declining);
    }

    #[test]
    fn test_update_memory_keeps_thirty_days() {
        let mut memory = RollingMemory::default();
        for day in 1..=32 {
            let state = DailyState::builder(format!("2026-01-{day:02}"))
                .mood(6)
                .topic("deadline")
                .build()
                .unwrap();
            memory = update_memory(&memory, &state);
        }
        assert_eq!(memory.history.len(), ROLLING_WINDOW_DAYS);
        assert_eq!(memory.history[0].date(), "2026-01-03");
        assert_eq!(memory.recurring_moods, vec!["6".to_string()]);
        assert_eq!(memory.recurring_stressors, vec!["deadline".to_string()]);
        assert!(memory.recurring_themes.is_empty());
    }

    #[test]
    fn test_update_memory_does_not_touch_previous() {
        let previous = RollingMemory::default();
        let state = DailyState::builder("2026-02-08").build().unwrap();
        let next = update_memory(&previous, &state);
        assert!(previous.history.is_empty());
        assert_eq!(next.history.len(), 1);
        assert!(next.recurring_moods.is_empty());
    }
}
