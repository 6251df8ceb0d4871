//! LLM bridge adapters.

pub mod http;
pub mod mock;

use std::sync::Arc;

pub use http::HttpLlmBridge;
pub use mock::{CannedLlmBridge, EchoLlmBridge};

use crate::domain::models::LlmConfig;
use crate::domain::ports::{LlmBridge, LlmError};

/// Build the configured bridge. `"none"` yields no bridge.
pub fn bridge_from_config(config: &LlmConfig) -> Result<Option<Arc<dyn LlmBridge>>, LlmError> {
    match config.provider.as_str() {
        "none" | "" => Ok(None),
        "mock" | "echo" => Ok(Some(Arc::new(EchoLlmBridge::default()))),
        "http" | "openai" => Ok(Some(Arc::new(HttpLlmBridge::from_config(config)?))),
        other => Err(LlmError::Request(format!("unknown LLM provider: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_selection() {
        let mut config = LlmConfig::default();
        assert!(bridge_from_config(&config).unwrap().is_none());

        config.provider = "mock".to_string();
        let bridge = bridge_from_config(&config).unwrap().unwrap();
        assert_eq!(bridge.name(), "echo");

        config.provider = "carrier-pigeon".to_string();
        assert!(bridge_from_config(&config).is_err());
    }
}
