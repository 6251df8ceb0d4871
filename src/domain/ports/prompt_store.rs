use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Avatar prompt sections. Missing sections are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBundle {
    pub identity: String,
    pub context: String,
    pub daily_state: String,
    pub style_rules: String,
    pub purpose: String,
}

/// Source of prompt templates.
#[async_trait]
pub trait PromptStore: Send + Sync {
    async fn load_bundle(&self) -> Result<PromptBundle>;
}
