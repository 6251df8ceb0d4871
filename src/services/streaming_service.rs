//! Projects a session journal onto an ordered server-sent-event sequence.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::stream::{self, Stream};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use super::canonical::to_spaced_string;
use super::stream_registry::{StreamRegistry, Subscription};
use crate::domain::errors::DomainResult;
use crate::domain::models::{EventType, SessionEvent};
use crate::domain::ports::SessionRepository;

/// Format one SSE frame: `event: <type>\ndata: <json>\n\n`.
///
/// Payloads use sorted keys with `", "` and `": "` separators. A `done`
/// event carrying a string `session_id` is written in its fixed literal form.
pub fn format_sse(event_type: EventType, payload: &Value) -> DomainResult<String> {
    if event_type == EventType::Done {
        if let Some(session_id) = payload.get("session_id").and_then(Value::as_str) {
            let quoted = to_spaced_string(&session_id)?;
            return Ok(format!(
                "event: done\ndata: {{ \"session_id\": {quoted} }}\n\n"
            ));
        }
    }
    Ok(format!(
        "event: {}\ndata: {}\n\n",
        event_type.as_str(),
        to_spaced_string(payload)?
    ))
}

pub struct StreamingService {
    repository: Arc<dyn SessionRepository>,
    registry: Arc<StreamRegistry>,
}

impl StreamingService {
    pub fn new(repository: Arc<dyn SessionRepository>, registry: Arc<StreamRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<StreamRegistry> {
        &self.registry
    }

    /// Persisted frames only, in index order, up to and including `done`.
    #[instrument(skip(self))]
    pub async fn replay_frames(&self, session_id: &str) -> DomainResult<Vec<String>> {
        let events = self.repository.get_events(session_id).await?;
        let mut frames = Vec::with_capacity(events.len());
        for event in events {
            frames.push(format_sse(event.event_type, &event.payload)?);
            if event.event_type == EventType::Done {
                break;
            }
        }
        Ok(frames)
    }

    /// Replay the journal, then follow live events until `done`.
    ///
    /// The stream ends after `done`, when `shutdown` fires (or its sender is
    /// dropped), or when the caller drops it. Each item is a whole frame.
    pub fn stream(
        &self,
        session_id: &str,
        shutdown: broadcast::Receiver<()>,
    ) -> impl Stream<Item = DomainResult<String>> + Send + 'static {
        let state = StreamState {
            session_id: session_id.to_string(),
            repository: Arc::clone(&self.repository),
            subscription: self.registry.subscribe(session_id),
            shutdown,
            last_index: 0,
            cursor: Cursor::Start,
        };
        stream::unfold(state, step)
    }
}

enum Cursor {
    Start,
    Replay(VecDeque<SessionEvent>),
    Live,
    Finished,
}

struct StreamState {
    session_id: String,
    repository: Arc<dyn SessionRepository>,
    subscription: Subscription,
    shutdown: broadcast::Receiver<()>,
    last_index: u64,
    cursor: Cursor,
}

impl StreamState {
    fn emit(mut self, event: &SessionEvent) -> (DomainResult<String>, Self) {
        self.last_index = self.last_index.max(event.event_index);
        if event.event_type == EventType::Done {
            self.cursor = Cursor::Finished;
            self.subscription.close();
        }
        (format_sse(event.event_type, &event.payload), self)
    }
}

async fn step(mut st: StreamState) -> Option<(DomainResult<String>, StreamState)> {
    loop {
        match std::mem::replace(&mut st.cursor, Cursor::Finished) {
            Cursor::Finished => return None,
            Cursor::Start => match st.repository.get_events(&st.session_id).await {
                Ok(events) => st.cursor = Cursor::Replay(events.into()),
                Err(e) => return Some((Err(e.into()), st)),
            },
            Cursor::Replay(mut pending) => {
                let Some(event) = pending.pop_front() else {
                    debug!(session_id = %st.session_id, "Replay complete, following live events");
                    st.cursor = Cursor::Live;
                    continue;
                };
                st.cursor = Cursor::Replay(pending);
                return Some(st.emit(&event));
            }
            Cursor::Live => {
                let event = tokio::select! {
                    event = st.subscription.next() => event,
                    _ = st.shutdown.recv() => {
                        debug!(session_id = %st.session_id, "Stream shut down");
                        return None;
                    }
                };
                st.cursor = Cursor::Live;
                // Already delivered during replay.
                if event.event_index <= st.last_index {
                    continue;
                }
                return Some(st.emit(&event));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::providers::{FixedTimeProvider, SequenceIdProvider};
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteSessionRepository};
    use crate::adapters::stores::StaticPromptStore;
    use crate::domain::models::{JournalConfig, SessionRequest};
    use crate::domain::ports::PromptBundle;
    use crate::services::determinism::DeterminismGuard;
    use crate::services::session_service::SessionService;
    use futures::StreamExt;
    use serde_json::json;
    use std::time::Duration;

    async fn setup() -> (Arc<SessionService>, StreamingService) {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = Arc::new(SqliteSessionRepository::new(pool));
        let sessions = SessionService::new(
            repo.clone(),
            Arc::new(StaticPromptStore::new(PromptBundle::default())),
            Arc::new(FixedTimeProvider::parse("2026-02-08T12:00:00Z").unwrap()),
            Arc::new(SequenceIdProvider::new("id")),
            DeterminismGuard::new(true),
            JournalConfig::default(),
        );
        let registry = Arc::new(StreamRegistry::new(Duration::from_secs(60)));
        (Arc::new(sessions), StreamingService::new(repo, registry))
    }

    fn request() -> SessionRequest {
        serde_json::from_value(json!({"user_state": {"date": "2026-02-08", "energy": 3}})).unwrap()
    }

    #[test]
    fn test_frame_format() {
        let frame = format_sse(EventType::Presence, &json!({"b": 1, "a": "x"})).unwrap();
        assert_eq!(frame, "event: presence\ndata: {\"a\": \"x\", \"b\": 1}\n\n");

        let done = format_sse(EventType::Done, &json!({"session_id": "s1"})).unwrap();
        assert_eq!(done, "event: done\ndata: { \"session_id\": \"s1\" }\n\n");
    }

    #[test]
    fn test_done_frame_escapes_session_id() {
        let done = format_sse(EventType::Done, &json!({"session_id": "a\"b\\c"})).unwrap();
        assert_eq!(done, "event: done\ndata: { \"session_id\": \"a\\\"b\\\\c\" }\n\n");

        let data = done
            .strip_prefix("event: done\ndata: ")
            .and_then(|d| d.strip_suffix("\n\n"))
            .unwrap();
        let parsed: Value = serde_json::from_str(data).unwrap();
        assert_eq!(parsed, json!({"session_id": "a\"b\\c"}));
    }

    #[tokio::test]
    async fn test_completed_session_replays_and_ends() {
        let (sessions, streaming) = setup().await;
        let created = sessions.create_session("u1", &request()).await.unwrap();

        let (_tx, rx) = broadcast::channel(1);
        let frames: Vec<String> = streaming
            .stream(&created.session_id, rx)
            .map(Result::unwrap)
            .collect()
            .await;

        assert_eq!(frames.len(), 6);
        assert!(frames[0].starts_with("event: avatar\n"));
        assert_eq!(
            frames[5],
            format!("event: done\ndata: {{ \"session_id\": \"{}\" }}\n\n", created.session_id)
        );
        assert_eq!(frames, streaming.replay_frames(&created.session_id).await.unwrap());
        assert!(streaming.registry().is_empty());
    }

    #[tokio::test]
    async fn test_follows_live_events_until_done() {
        let (sessions, streaming) = setup().await;
        let session_id = sessions.start_session("u1").await.unwrap();
        let before = sessions
            .append_live_event(&session_id, EventType::Heartbeat, json!({"ts": 1}))
            .await
            .unwrap();
        // Published and persisted before the stream starts: must not repeat.
        streaming.registry().publish(before);

        let (_tx, rx) = broadcast::channel(1);
        let stream = streaming.stream(&session_id, rx);

        let publisher = Arc::clone(&sessions);
        let registry = Arc::clone(streaming.registry());
        let id = session_id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            for (event_type, payload) in [
                (EventType::Presence, json!({"state": "AWAKE"})),
                (EventType::Done, json!({"session_id": id})),
            ] {
                let event = publisher.append_live_event(&id, event_type, payload).await.unwrap();
                registry.publish(event);
            }
        });

        let frames: Vec<String> = tokio::time::timeout(
            Duration::from_secs(5),
            stream.map(Result::unwrap).collect::<Vec<_>>(),
        )
        .await
        .unwrap();
        let kinds: Vec<&str> = frames
            .iter()
            .map(|f| f.lines().next().unwrap())
            .collect();
        assert_eq!(kinds, ["event: heartbeat", "event: presence", "event: done"]);
    }

    #[tokio::test]
    async fn test_shutdown_stops_waiting() {
        let (sessions, streaming) = setup().await;
        let session_id = sessions.start_session("u1").await.unwrap();
        let (tx, rx) = broadcast::channel(1);
        let stream = streaming.stream(&session_id, rx);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tx.send(()).unwrap();
        });
        let frames: Vec<_> = tokio::time::timeout(Duration::from_secs(5), stream.collect::<Vec<_>>())
            .await
            .unwrap();
        assert!(frames.is_empty());
    }
}
