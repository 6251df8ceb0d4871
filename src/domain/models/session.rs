//! Session records, journal events and the session request/response shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::daily_state::DailyState;
use super::phases::PresenceDescriptor;
use crate::domain::errors::DomainError;

/// Version tag stored with every session record.
pub const REFLECTO_VERSION: &str = "reflecto-v1.0";

/// Source tag stamped on journal events written by the session service.
pub const SESSION_SOURCE: &str = "session_service";

/// Fixed vocabulary of journal event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TimelinePhase,
    Avatar,
    Questions,
    ResponseChunk,
    Presence,
    Closing,
    Done,
    Heartbeat,
    Skills,
    TimeOfDay,
}

impl EventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimelinePhase => "timeline_phase",
            Self::Avatar => "avatar",
            Self::Questions => "questions",
            Self::ResponseChunk => "response_chunk",
            Self::Presence => "presence",
            Self::Closing => "closing",
            Self::Done => "done",
            Self::Heartbeat => "heartbeat",
            Self::Skills => "skills",
            Self::TimeOfDay => "time_of_day",
        }
    }

    /// Event types that count towards a day's meaningful activity.
    pub const fn is_meaningful(self) -> bool {
        matches!(self, Self::Presence | Self::Skills | Self::TimeOfDay)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timeline_phase" => Ok(Self::TimelinePhase),
            "avatar" => Ok(Self::Avatar),
            "questions" => Ok(Self::Questions),
            "response_chunk" => Ok(Self::ResponseChunk),
            "presence" => Ok(Self::Presence),
            "closing" => Ok(Self::Closing),
            "done" => Ok(Self::Done),
            "heartbeat" => Ok(Self::Heartbeat),
            "skills" => Ok(Self::Skills),
            "time_of_day" => Ok(Self::TimeOfDay),
            other => Err(DomainError::UnknownEventType(other.to_string())),
        }
    }
}

/// One entry of a session's append-only journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub id: String,
    pub session_id: String,
    pub timestamp: String,
    pub event_index: u64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: Value,
    pub source: String,
    pub event_hash: Option<String>,
    pub prev_hash: Option<String>,
}

/// Stored session with its computed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub created_at: String,
    pub data: Value,
    pub version: String,
}

/// Flow context supplied alongside the user state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_asked: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deep_agreed: bool,
    /// Keys the pipeline does not interpret but which feed the input hash.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full input to a session run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub user_state: Map<String, Value>,
    #[serde(default)]
    pub history: Vec<DailyState>,
    #[serde(default)]
    pub flow_context: FlowContext,
    #[serde(default)]
    pub raw_response: Option<String>,
}

/// Meta block of a session output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub paused: bool,
    pub closed: bool,
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_hash_algo: Option<String>,
}

/// Human-facing result of a session run, as stored and replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutput {
    pub avatar_prompt: String,
    pub questions: Vec<String>,
    pub response: Option<String>,
    pub presence: PresenceDescriptor,
    pub continuity_phrase: Option<String>,
    pub closing_phrase: Option<String>,
    pub meta: SessionMeta,
}

/// Replay envelope returned for audit reads. Never recomputes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEnvelope {
    pub mode: String,
    pub recomputed: bool,
    pub session: Value,
}

impl ReplayEnvelope {
    /// Project a stored record's data onto the replay shape.
    pub fn from_record(record: &SessionRecord) -> Self {
        const KEYS: [&str; 7] = [
            "avatar_prompt",
            "questions",
            "response",
            "presence",
            "continuity_phrase",
            "closing_phrase",
            "meta",
        ];
        let session: Map<String, Value> = KEYS
            .iter()
            .map(|k| ((*k).to_string(), record.data.get(*k).cloned().unwrap_or(Value::Null)))
            .collect();
        Self {
            mode: "replay".to_string(),
            recomputed: false,
            session: Value::Object(session),
        }
    }
}

/// Result of walking a session's hash chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainVerification {
    pub session_id: String,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<String>,
}

/// Result of re-hashing a submitted input against a stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputVerification {
    pub session_id: String,
    #[serde(rename = "match")]
    pub matches: bool,
    pub stored_hash: Option<String>,
    pub computed_hash: String,
    pub algorithm: String,
}
