use crate::domain::models::Action;
use anyhow::Result;
use async_trait::async_trait;

/// Session-scoped log of user actions.
#[async_trait]
pub trait ActionStore: Send + Sync {
    /// Appends an action and returns the session's action count.
    async fn add_action(&self, session_id: &str, action: Action) -> Result<usize>;

    /// Returns the session's actions in insertion order.
    async fn get_actions(&self, session_id: &str) -> Result<Vec<Action>>;
}
