//! Session lifecycle: run the pipeline, persist the record, journal the events.

use std::sync::Arc;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::canonical::{sha256_hex, to_canonical_string};
use super::determinism::DeterminismGuard;
use super::hash_chain::{verify_chain, ChainBuilder};
use super::orchestrator::run_reflection;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ChainVerification, EventType, InputVerification, JournalConfig, ReplayEnvelope, SessionEvent,
    SessionOutput, SessionRecord, SessionRequest, REFLECTO_VERSION,
};
use crate::domain::ports::{IdProvider, PromptStore, SessionRepository, TimeProvider};

pub const INPUT_HASH_ALGO: &str = "sha256";

/// Result of creating a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: String,
    pub session: SessionOutput,
}

pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
    prompts: Arc<dyn PromptStore>,
    time: Arc<dyn TimeProvider>,
    ids: Arc<dyn IdProvider>,
    guard: DeterminismGuard,
    journal: JournalConfig,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        prompts: Arc<dyn PromptStore>,
        time: Arc<dyn TimeProvider>,
        ids: Arc<dyn IdProvider>,
        guard: DeterminismGuard,
        journal: JournalConfig,
    ) -> Self {
        Self {
            repository,
            prompts,
            time,
            ids,
            guard,
            journal,
        }
    }

    fn now(&self) -> String {
        self.time.now().to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    fn event_id(&self) -> String {
        format!("evt_{}", self.ids.new_id())
    }

    /// Run the pipeline for `request`, store the session and append its journal.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn create_session(
        &self,
        user_id: &str,
        request: &SessionRequest,
    ) -> DomainResult<CreatedSession> {
        self.guard
            .check_providers(Some(self.time.as_ref()), Some(self.ids.as_ref()))?;

        let prompts = self.prompts.load_bundle().await?;
        let reflection = run_reflection(request, &prompts)?;

        let mut session = reflection.to_output();
        session.meta.input_hash = Some(compute_input_hash(request)?);
        session.meta.input_hash_algo = Some(INPUT_HASH_ALGO.to_string());

        let timestamp = self.now();
        let record = SessionRecord {
            id: self.ids.new_id(),
            user_id: user_id.to_string(),
            created_at: timestamp.clone(),
            data: serde_json::to_value(&session)?,
            version: REFLECTO_VERSION.to_string(),
        };
        let events = self.journal_events(&record.id, &timestamp, &session)?;
        let count = events.len();
        let session_id = self.repository.save_with_events(record, events).await?;

        info!(session_id = %session_id, events = count, "Session created");
        Ok(CreatedSession { session_id, session })
    }

    /// Open an empty session that live emissions can attach to.
    pub async fn start_session(&self, user_id: &str) -> DomainResult<String> {
        self.guard
            .check_providers(Some(self.time.as_ref()), Some(self.ids.as_ref()))?;
        let record = SessionRecord {
            id: self.ids.new_id(),
            user_id: user_id.to_string(),
            created_at: self.now(),
            data: json!({}),
            version: REFLECTO_VERSION.to_string(),
        };
        let session_id = self.repository.save(record).await?;
        info!(session_id = %session_id, user_id, "Session started");
        Ok(session_id)
    }

    /// The fixed event sequence for a fresh session.
    fn journal_events(
        &self,
        session_id: &str,
        timestamp: &str,
        session: &SessionOutput,
    ) -> DomainResult<Vec<SessionEvent>> {
        let phases = self.journal.timeline_phases;
        let phase = |name: &str| (EventType::TimelinePhase, json!({ "phase": name }));

        let mut plan: Vec<(EventType, Value)> = Vec::new();
        if phases {
            plan.push(phase("start"));
        }
        plan.push((
            EventType::Avatar,
            json!({ "avatar_prompt": session.avatar_prompt }),
        ));
        plan.push((EventType::Questions, json!({ "questions": session.questions })));
        plan.push((
            EventType::ResponseChunk,
            json!({ "text": session.response.clone().unwrap_or_default() }),
        ));
        plan.push((EventType::Presence, serde_json::to_value(&session.presence)?));
        if phases {
            plan.extend(["presence", "memory", "voice", "continuity"].map(phase));
        }
        plan.push((
            EventType::Closing,
            json!({ "closing_phrase": session.closing_phrase }),
        ));
        if phases {
            plan.push(phase("closing"));
        }
        plan.push((EventType::Done, json!({ "session_id": session_id })));

        let mut chain = ChainBuilder::new(session_id, timestamp, &self.journal.source);
        plan.into_iter()
            .map(|(event_type, payload)| chain.next_event(self.event_id(), event_type, payload))
            .collect()
    }

    /// Append one live event after the journal's current tail.
    pub async fn append_live_event(
        &self,
        session_id: &str,
        event_type: EventType,
        payload: Value,
    ) -> DomainResult<SessionEvent> {
        let last = self.repository.last_event(session_id).await?;
        let mut chain =
            ChainBuilder::new(session_id, self.now(), &self.journal.source).resume(last.as_ref());
        let event = chain.next_event(self.event_id(), event_type, payload)?;
        self.repository.append_event(event.clone()).await?;
        Ok(event)
    }

    pub async fn get_session(&self, session_id: &str) -> DomainResult<Option<SessionRecord>> {
        Ok(self.repository.get(session_id).await?)
    }

    pub async fn list_sessions(&self, user_id: &str) -> DomainResult<Vec<SessionRecord>> {
        Ok(self.repository.list_for_user(user_id).await?)
    }

    pub async fn events(&self, session_id: &str) -> DomainResult<Vec<SessionEvent>> {
        Ok(self.repository.get_events(session_id).await?)
    }

    /// Stored output, never recomputed. `None` for an unknown session.
    pub async fn replay_session(&self, session_id: &str) -> DomainResult<Option<ReplayEnvelope>> {
        Ok(self
            .repository
            .get(session_id)
            .await?
            .map(|record| ReplayEnvelope::from_record(&record)))
    }

    /// Walk the session's journal and report the first hash mismatch.
    #[instrument(skip(self))]
    pub async fn verify_event_chain(&self, session_id: &str) -> DomainResult<ChainVerification> {
        let events = self.repository.get_events(session_id).await?;
        let result = verify_chain(session_id, &events)?;
        if !result.valid {
            warn!(index = ?result.index, "Event chain mismatch");
        }
        Ok(result)
    }

    /// Compare `request` against the input hash stored with the session.
    pub async fn verify_session_input(
        &self,
        session_id: &str,
        request: &SessionRequest,
    ) -> DomainResult<Option<InputVerification>> {
        let Some(record) = self.repository.get(session_id).await? else {
            return Ok(None);
        };
        let stored_hash = record
            .data
            .pointer("/meta/input_hash")
            .and_then(Value::as_str)
            .map(str::to_string);
        let computed_hash = compute_input_hash(request)?;
        Ok(Some(InputVerification {
            session_id: session_id.to_string(),
            matches: stored_hash.as_deref() == Some(computed_hash.as_str()),
            stored_hash,
            computed_hash,
            algorithm: INPUT_HASH_ALGO.to_string(),
        }))
    }

    /// Like [`Self::replay_session`] but unknown ids are an error.
    pub async fn require_replay(&self, session_id: &str) -> DomainResult<ReplayEnvelope> {
        self.replay_session(session_id)
            .await?
            .ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))
    }
}

/// SHA-256 over the canonical JSON of the full request.
pub fn compute_input_hash(request: &SessionRequest) -> DomainResult<String> {
    Ok(sha256_hex(&to_canonical_string(request)?))
}
