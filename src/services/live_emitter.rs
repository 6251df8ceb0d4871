//! Periodic live emissions for an open session.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{info, instrument, warn};

use super::live_presence::{derive_presence, derive_skills};
use super::session_service::SessionService;
use super::stream_registry::StreamRegistry;
use crate::domain::errors::DomainResult;
use crate::domain::models::{EventType, StreamingConfig, TimeOfDay};
use crate::domain::ports::{ActionStore, TimeProvider};

/// Journals and publishes heartbeat, presence, skills and time-of-day events
/// on their configured intervals.
pub struct LiveEmitter {
    sessions: Arc<SessionService>,
    actions: Arc<dyn ActionStore>,
    registry: Arc<StreamRegistry>,
    time: Arc<dyn TimeProvider>,
    config: StreamingConfig,
}

fn ticker(secs: u64) -> Interval {
    let mut ticker = interval(Duration::from_secs(secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

impl LiveEmitter {
    pub fn new(
        sessions: Arc<SessionService>,
        actions: Arc<dyn ActionStore>,
        registry: Arc<StreamRegistry>,
        time: Arc<dyn TimeProvider>,
        config: StreamingConfig,
    ) -> Self {
        Self {
            sessions,
            actions,
            registry,
            time,
            config,
        }
    }

    /// Emit until shutdown, or until `max_events` have been emitted.
    ///
    /// Reaching `max_events` closes the session with a `done` event. Failed
    /// emissions are logged and skipped. Returns the number of events emitted,
    /// not counting `done`.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(
        &self,
        session_id: &str,
        mut shutdown_rx: broadcast::Receiver<()>,
        max_events: Option<u64>,
    ) -> DomainResult<u64> {
        let mut heartbeat = ticker(self.config.heartbeat_secs);
        let mut presence = ticker(self.config.presence_secs);
        let mut skills = ticker(self.config.skills_secs);
        let mut time_of_day = ticker(self.config.time_of_day_secs);
        let mut emitted = 0_u64;

        info!(session_id, "Live emission started");
        loop {
            if max_events.is_some_and(|max| emitted >= max) {
                self.emit(session_id, EventType::Done, json!({ "session_id": session_id }))
                    .await;
                break;
            }

            let event_type = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = heartbeat.tick() => EventType::Heartbeat,
                _ = presence.tick() => EventType::Presence,
                _ = skills.tick() => EventType::Skills,
                _ = time_of_day.tick() => EventType::TimeOfDay,
            };

            match self.payload(session_id, event_type).await {
                Ok(payload) => {
                    if self.emit(session_id, event_type, payload).await {
                        emitted += 1;
                    }
                }
                Err(e) => warn!(session_id, event_type = %event_type, error = %e, "Live payload failed"),
            }
        }

        info!(session_id, emitted, "Live emission stopped");
        Ok(emitted)
    }

    async fn payload(&self, session_id: &str, event_type: EventType) -> DomainResult<Value> {
        let now = self.time.now();
        Ok(match event_type {
            EventType::Heartbeat => json!({ "ts": now.timestamp() }),
            EventType::Presence => {
                let actions = self.actions.get_actions(session_id).await?;
                serde_json::to_value(derive_presence(&actions, now))?
            }
            EventType::Skills => {
                let actions = self.actions.get_actions(session_id).await?;
                serde_json::to_value(derive_skills(&actions))?
            }
            _ => json!({ "time_of_day": TimeOfDay::from_hour(now.hour()).as_str() }),
        })
    }

    async fn emit(&self, session_id: &str, event_type: EventType, payload: Value) -> bool {
        match self
            .sessions
            .append_live_event(session_id, event_type, payload)
            .await
        {
            Ok(event) => {
                self.registry.publish(event);
                true
            }
            Err(e) => {
                warn!(session_id, event_type = %event_type, error = %e, "Live emission failed");
                false
            }
        }
    }
}
