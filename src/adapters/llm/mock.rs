//! Deterministic bridges for tests and offline runs.

use async_trait::async_trait;

use crate::domain::ports::{LlmBridge, LlmError};

/// Returns a fixed transform of the prompt, safe under determinism.
#[derive(Debug, Clone, Default)]
pub struct EchoLlmBridge {
    prefix: String,
}

impl EchoLlmBridge {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl LlmBridge for EchoLlmBridge {
    fn name(&self) -> &str {
        "echo"
    }

    fn deterministic_safe(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let last_line = prompt.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
        Ok(format!("{}{}", self.prefix, last_line.trim()))
    }
}

/// Replays a canned reply. Reports itself as non-deterministic unless told otherwise.
#[derive(Debug, Clone)]
pub struct CannedLlmBridge {
    reply: Result<String, String>,
    deterministic_safe: bool,
}

impl CannedLlmBridge {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            deterministic_safe: false,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            deterministic_safe: false,
        }
    }

    #[must_use]
    pub const fn deterministic(mut self, safe: bool) -> Self {
        self.deterministic_safe = safe;
        self
    }
}

#[async_trait]
impl LlmBridge for CannedLlmBridge {
    fn name(&self) -> &str {
        "canned"
    }

    fn deterministic_safe(&self) -> bool {
        self.deterministic_safe
    }

    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        self.reply.clone().map_err(LlmError::Request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_is_stable() {
        let bridge = EchoLlmBridge::new("> ");
        let prompt = "Reflect on today.\nMood: 7\n\n";
        let first = bridge.generate(prompt).await.unwrap();
        assert_eq!(first, "> Mood: 7");
        assert_eq!(bridge.generate(prompt).await.unwrap(), first);
        assert!(bridge.deterministic_safe());
    }

    #[tokio::test]
    async fn test_canned_reply_and_failure() {
        let ok = CannedLlmBridge::replying("7");
        assert_eq!(ok.generate("x").await.unwrap(), "7");
        assert!(!ok.deterministic_safe());
        assert!(ok.clone().deterministic(true).deterministic_safe());

        let err = CannedLlmBridge::failing("offline").generate("x").await.unwrap_err();
        assert!(err.is_transient());
    }
}
