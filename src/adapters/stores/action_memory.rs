//! In-process action log keyed by session.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::models::Action;
use crate::domain::ports::ActionStore;

/// Actions live for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActionStore {
    actions: Arc<RwLock<HashMap<String, Vec<Action>>>>,
}

impl InMemoryActionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActionStore for InMemoryActionStore {
    async fn add_action(&self, session_id: &str, action: Action) -> Result<usize> {
        let mut actions = self.actions.write().await;
        let list = actions.entry(session_id.to_string()).or_default();
        list.push(action);
        Ok(list.len())
    }

    async fn get_actions(&self, session_id: &str) -> Result<Vec<Action>> {
        Ok(self
            .actions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ActionType;

    fn action(action_type: ActionType, value: Option<f64>) -> Action {
        Action {
            action_type,
            value,
            note: None,
            ts: "2026-02-08T12:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_actions_are_per_session_and_ordered() {
        let store = InMemoryActionStore::new();
        assert_eq!(store.add_action("s1", action(ActionType::CheckIn, None)).await.unwrap(), 1);
        assert_eq!(
            store.add_action("s1", action(ActionType::LogMood, Some(30.0))).await.unwrap(),
            2
        );
        store.add_action("s2", action(ActionType::LogFocus, Some(80.0))).await.unwrap();

        let s1 = store.get_actions("s1").await.unwrap();
        assert_eq!(s1.len(), 2);
        assert_eq!(s1[1].action_type, ActionType::LogMood);
        assert!(store.get_actions("unknown").await.unwrap().is_empty());
    }
}
