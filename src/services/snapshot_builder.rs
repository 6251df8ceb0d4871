//! Folds one day's journal into a [`DailySnapshot`].

use serde_json::Value;

use crate::domain::models::{DailySnapshot, EventType, SessionEvent};

/// Build a fresh snapshot from events in append order.
///
/// Pure: the same event list always yields the same snapshot.
pub fn build_daily_snapshot(events: &[SessionEvent]) -> DailySnapshot {
    let mut snapshot = DailySnapshot::default();

    for event in events {
        *snapshot
            .counts
            .entry(event.event_type.as_str().to_string())
            .or_insert(0) += 1;

        match event.event_type {
            EventType::Presence => {
                snapshot.last_presence = Some(event.payload.clone());
            }
            EventType::TimeOfDay => {
                snapshot.last_time_of_day = event
                    .payload
                    .get("time_of_day")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            EventType::Skills => {
                if let Some(map) = event.payload.as_object() {
                    snapshot.skills = map
                        .iter()
                        .filter_map(|(k, v)| skill_level(v).map(|level| (k.clone(), level)))
                        .collect();
                }
            }
            _ => {}
        }

        if event.event_type.is_meaningful() {
            snapshot.meaningful_events += 1;
        }
    }

    snapshot
}

#[allow(clippy::cast_possible_truncation)]
fn skill_level(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
}
