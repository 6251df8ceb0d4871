//! OpenAI-compatible chat completions bridge.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::models::LlmConfig;
use crate::domain::ports::{LlmBridge, LlmError};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Chat completions client with a request-rate ceiling and retry on transient failures.
///
/// Network responses vary between calls, so this bridge is never deterministic-safe.
pub struct HttpLlmBridge {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    limiter: DirectLimiter,
    max_retries: u32,
    initial_backoff: Duration,
}

impl HttpLlmBridge {
    /// Build from config, reading the API key from `config.api_key_env`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key).map_err(|e| LlmError::Request(format!("{e:#}")))
    }

    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            limiter: RateLimiter::direct(Quota::per_second(rps)),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(500),
        })
    }

    /// Shorten the first retry delay. Used by tests against a local server.
    #[must_use]
    pub const fn with_initial_backoff(mut self, delay: Duration) -> Self {
        self.initial_backoff = delay;
        self
    }

    async fn send_once(&self, prompt: &str) -> Result<String, LlmError> {
        self.limiter.until_ready().await;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| LlmError::Malformed("no choices in response".to_string()))
    }
}

#[async_trait]
impl LlmBridge for HttpLlmBridge {
    fn name(&self) -> &str {
        "http"
    }

    fn deterministic_safe(&self) -> bool {
        false
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let attempts = AtomicU32::new(0);
        let policy = ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_elapsed_time: Some(Duration::from_secs(120)),
            ..ExponentialBackoff::default()
        };

        let attempts = &attempts;
        backoff::future::retry(policy, move || async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            debug!(attempt, model = %self.model, "Sending LLM request");
            self.send_once(prompt).await.map_err(|err| {
                if err.is_transient() && attempt < self.max_retries {
                    warn!(attempt, error = %err, "Transient LLM failure, retrying");
                    backoff::Error::transient(err)
                } else {
                    backoff::Error::permanent(err)
                }
            })
        })
        .await
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Deserialize)]
struct ChatContent {
    content: String,
}
