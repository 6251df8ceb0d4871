//! Common test utilities for integration tests
//!
//! Shared fixtures for building deterministic services over one database.

#![allow(dead_code)]

use std::sync::Arc;

use reflecto::adapters::providers::{FixedTimeProvider, SequenceIdProvider};
use reflecto::adapters::sqlite::SqliteSessionRepository;
use reflecto::adapters::stores::StaticPromptStore;
use reflecto::domain::models::{DailyState, FlowContext, JournalConfig, SessionRequest};
use reflecto::domain::ports::PromptBundle;
use reflecto::services::{DeterminismGuard, SessionService};
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// A deterministic session service pinned to `instant`, handing out `<prefix>N` ids.
pub fn session_service(pool: &SqlitePool, instant: &str, prefix: &str) -> SessionService {
    SessionService::new(
        Arc::new(SqliteSessionRepository::new(pool.clone())),
        Arc::new(StaticPromptStore::new(PromptBundle::default())),
        Arc::new(FixedTimeProvider::parse(instant).expect("valid instant")),
        Arc::new(SequenceIdProvider::new(prefix)),
        DeterminismGuard::new(true),
        JournalConfig::default(),
    )
}

/// A request for `date` with the given user-state scores.
pub fn request(date: &str, scores: Value) -> SessionRequest {
    let mut user_state = json!({ "date": date });
    if let (Some(target), Some(extra)) = (user_state.as_object_mut(), scores.as_object()) {
        target.extend(extra.clone());
    }
    SessionRequest {
        user_state: serde_json::from_value(user_state).expect("object"),
        history: Vec::new(),
        flow_context: FlowContext::default(),
        raw_response: None,
    }
}

/// Like [`request`] with earlier days as history, oldest first.
pub fn request_with_history(date: &str, scores: Value, history: Vec<DailyState>) -> SessionRequest {
    SessionRequest {
        history,
        ..request(date, scores)
    }
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
