//! Tamper-evident hash chain over a session's event journal.
//!
//! Each event hashes `{type, payload, event_index, timestamp, prev_hash}` in
//! canonical JSON, with `prev_hash` of the first event being null.

use serde_json::{json, Value};

use super::canonical::{sha256_hex, to_canonical_string};
use crate::domain::errors::DomainResult;
use crate::domain::models::{ChainVerification, EventType, SessionEvent};

/// Hash one event given the previous event's hash.
pub fn event_hash(
    event_type: EventType,
    payload: &Value,
    event_index: u64,
    timestamp: &str,
    prev_hash: Option<&str>,
) -> DomainResult<String> {
    let canonical = json!({
        "type": event_type.as_str(),
        "payload": payload,
        "event_index": event_index,
        "timestamp": timestamp,
        "prev_hash": prev_hash,
    });
    Ok(sha256_hex(&to_canonical_string(&canonical)?))
}

/// Appends chained events for one session under a single timestamp.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
    session_id: String,
    timestamp: String,
    source: String,
    next_index: u64,
    prev_hash: Option<String>,
}

impl ChainBuilder {
    pub fn new(
        session_id: impl Into<String>,
        timestamp: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp: timestamp.into(),
            source: source.into(),
            next_index: 1,
            prev_hash: None,
        }
    }

    /// Continue an existing chain after its last stored event.
    pub fn resume(mut self, last: Option<&SessionEvent>) -> Self {
        if let Some(last) = last {
            self.next_index = last.event_index + 1;
            self.prev_hash.clone_from(&last.event_hash);
        }
        self
    }

    /// Build the next event. The caller persists it.
    pub fn next_event(
        &mut self,
        id: String,
        event_type: EventType,
        payload: Value,
    ) -> DomainResult<SessionEvent> {
        let index = self.next_index;
        let hash = event_hash(
            event_type,
            &payload,
            index,
            &self.timestamp,
            self.prev_hash.as_deref(),
        )?;
        let event = SessionEvent {
            id,
            session_id: self.session_id.clone(),
            timestamp: self.timestamp.clone(),
            event_index: index,
            event_type,
            payload,
            source: self.source.clone(),
            event_hash: Some(hash.clone()),
            prev_hash: self.prev_hash.replace(hash),
        };
        self.next_index += 1;
        Ok(event)
    }
}

/// Re-walk the chain from the start and report the first mismatch.
///
/// Events without a stored hash are trusted and chained on their computed
/// hash.
pub fn verify_chain(session_id: &str, events: &[SessionEvent]) -> DomainResult<ChainVerification> {
    let mut prev: Option<String> = None;
    for event in events {
        let computed = event_hash(
            event.event_type,
            &event.payload,
            event.event_index,
            &event.timestamp,
            prev.as_deref(),
        )?;
        match &event.event_hash {
            Some(stored) if *stored != computed => {
                return Ok(ChainVerification {
                    session_id: session_id.to_string(),
                    valid: false,
                    index: Some(event.event_index),
                    expected: Some(stored.clone()),
                    computed: Some(computed),
                });
            }
            Some(stored) => prev = Some(stored.clone()),
            None => prev = Some(computed),
        }
    }
    Ok(ChainVerification {
        session_id: session_id.to_string(),
        valid: true,
        index: None,
        expected: None,
        computed: None,
    })
}
