use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by an LLM bridge.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response malformed: {0}")]
    Malformed(String),

    #[error("LLM API key missing from environment variable {0}")]
    MissingApiKey(String),
}

impl LlmError {
    /// Rate limits, server errors and transport failures are worth retrying.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Malformed(_) | Self::MissingApiKey(_) => false,
        }
    }
}

/// Text generation capability.
#[async_trait]
pub trait LlmBridge: Send + Sync {
    /// Short name used in logs and determinism errors.
    fn name(&self) -> &str;

    /// Whether the bridge returns identical output for identical prompts.
    fn deterministic_safe(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
