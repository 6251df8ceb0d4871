//! Runs the reflection pipeline end to end in its fixed stage order.

use serde_json::Value;
use tracing::debug;

use super::avatar_prompt::build_avatar_prompt;
use super::memory_intelligence::analyze_memory_patterns;
use super::phases::{
    apply_voice, build_presence, decide_closing, decide_continuity, decide_silence,
    shape_response,
};
use super::question_flow::today_questions;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ClosingDescriptor, ContinuityDescriptor, DailyState, HistoryEntry, MemoryPatterns,
    PresenceDescriptor, SessionMeta, SessionOutput, SessionRequest, SilenceDescriptor,
    VoiceResult,
};
use crate::domain::ports::PromptBundle;

/// Frozen result of one pipeline run.
///
/// Fields are only reachable through shared references, so a caller holding
/// a `Reflection` cannot alter what a later reader of the same run sees.
#[derive(Debug, Clone, PartialEq)]
pub struct Reflection {
    today: DailyState,
    avatar_prompt: String,
    questions: Vec<String>,
    memory: MemoryPatterns,
    presence: PresenceDescriptor,
    shaped_response: Option<String>,
    silence: SilenceDescriptor,
    continuity: ContinuityDescriptor,
    voice: VoiceResult,
    closing: ClosingDescriptor,
}

impl Reflection {
    pub const fn today(&self) -> &DailyState {
        &self.today
    }

    pub fn avatar_prompt(&self) -> &str {
        &self.avatar_prompt
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub const fn memory(&self) -> &MemoryPatterns {
        &self.memory
    }

    pub const fn presence(&self) -> &PresenceDescriptor {
        &self.presence
    }

    pub fn shaped_response(&self) -> Option<&str> {
        self.shaped_response.as_deref()
    }

    pub const fn silence(&self) -> &SilenceDescriptor {
        &self.silence
    }

    pub const fn continuity(&self) -> &ContinuityDescriptor {
        &self.continuity
    }

    pub const fn voice(&self) -> &VoiceResult {
        &self.voice
    }

    pub const fn closing(&self) -> &ClosingDescriptor {
        &self.closing
    }

    /// Human-facing output. The response is the voiced text when a raw
    /// response was supplied, otherwise the closing phrase.
    pub fn to_output(&self) -> SessionOutput {
        let response = if self.shaped_response.is_some() {
            Some(self.voice.text.clone())
        } else {
            self.closing.closing_phrase.clone()
        };
        SessionOutput {
            avatar_prompt: self.avatar_prompt.clone(),
            questions: self.questions.clone(),
            response,
            presence: self.presence.clone(),
            continuity_phrase: self.continuity.recall_phrase.clone(),
            closing_phrase: self.closing.closing_phrase.clone(),
            meta: SessionMeta {
                paused: self.silence.should_pause,
                closed: self.closing.should_close,
                voice: Some(self.voice.voice.as_str().to_string()),
                input_hash: None,
                input_hash_algo: None,
            },
        }
    }
}

/// Work out today's state.
///
/// Scores in `user_state` win, dated from `user_state.date` or the newest
/// history entry. Otherwise the newest history entry is today. A bare
/// `user_state.date` yields default scores.
pub fn resolve_today(request: &SessionRequest) -> DomainResult<DailyState> {
    let user_state = Value::Object(request.user_state.clone());
    let user_date = request.user_state.get("date").and_then(Value::as_str);

    if DailyState::has_scores(&user_state) {
        let date = user_date
            .or_else(|| request.history.last().map(DailyState::date))
            .ok_or(DomainError::MissingDate)?
            .to_string();
        let mut dated = request.user_state.clone();
        dated.insert("date".to_string(), Value::String(date));
        return DailyState::from_value(&Value::Object(dated));
    }
    if let Some(last) = request.history.last() {
        return Ok(last.clone());
    }
    match user_date {
        Some(_) => DailyState::from_value(&user_state),
        None => Err(DomainError::MissingDate),
    }
}

/// Run every stage in order and freeze the result.
pub fn run_reflection(request: &SessionRequest, prompts: &PromptBundle) -> DomainResult<Reflection> {
    let today = resolve_today(request)?;
    let flow = &request.flow_context;

    let avatar_prompt = build_avatar_prompt(prompts, &request.user_state);
    let questions = today_questions(Some(today.energy()), flow.deep_agreed);

    let history: Vec<HistoryEntry> = request.history.iter().map(HistoryEntry::from).collect();
    let memory = analyze_memory_patterns(&history);

    let presence = build_presence(Some(&today), &memory, flow);
    let shaped_response = request
        .raw_response
        .as_deref()
        .map(|raw| shape_response(raw, &presence));
    let silence = decide_silence(&presence, &memory, flow);
    let continuity = decide_continuity(&memory, &silence);
    let voice = apply_voice(shaped_response.as_deref().unwrap_or(""), &presence, &silence);
    let closing = decide_closing(&presence, &silence, &voice, flow);

    debug!(
        date = today.date(),
        voice = voice.voice.as_str(),
        paused = silence.should_pause,
        closed = closing.should_close,
        "Reflection pipeline complete"
    );

    Ok(Reflection {
        today,
        avatar_prompt,
        questions,
        memory,
        presence,
        shaped_response,
        silence,
        continuity,
        voice,
        closing,
    })
}
