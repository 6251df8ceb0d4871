//! Session repository port (trait) for dependency injection.
//!
//! Defines the contract for session and journal storage that infrastructure
//! adapters must implement. Services depend on this trait, not concrete implementations.

use crate::domain::models::{SessionEvent, SessionRecord};
use anyhow::Result;
use async_trait::async_trait;

/// Repository trait for sessions and their append-only event journal
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a session record and returns its id
    ///
    /// # Errors
    /// Returns error if:
    /// - Session ID already exists
    /// - Database connection fails
    /// - JSON serialization fails
    async fn save(&self, record: SessionRecord) -> Result<String>;

    /// Stores a session record together with its opening journal
    ///
    /// Either the record and every event are written, or nothing is.
    async fn save_with_events(&self, record: SessionRecord, events: Vec<SessionEvent>) -> Result<String>;

    /// Retrieves a session by ID, `None` when unknown
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    /// Lists a user's sessions, newest first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SessionRecord>>;

    /// Appends one event to a session journal
    ///
    /// Events are never updated or deleted once written.
    ///
    /// # Errors
    /// Returns error if the `(session_id, event_index)` pair already exists
    async fn append_event(&self, event: SessionEvent) -> Result<()>;

    /// Returns a session's events in append order
    async fn get_events(&self, session_id: &str) -> Result<Vec<SessionEvent>>;

    /// Returns the most recently appended event of a session
    async fn last_event(&self, session_id: &str) -> Result<Option<SessionEvent>>;

    /// Returns every event of a user's sessions stamped on `day` (YYYY-MM-DD), in append order
    async fn events_for_user_day(&self, user_id: &str, day: &str) -> Result<Vec<SessionEvent>>;
}
