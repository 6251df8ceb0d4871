//! OpenAI-compatible image generation for the daily avatar.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::models::AvatarConfig;
use crate::domain::ports::AvatarImageGenerator;

/// Writes `<output_dir>/<user>_<day>.png`. All failures are logged and yield `None`.
pub struct HttpAvatarImageGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    output_dir: PathBuf,
}

impl HttpAvatarImageGenerator {
    pub fn new(config: &AvatarConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            output_dir: PathBuf::from(&config.output_dir),
        })
    }

    async fn try_generate(&self, user_id: &str, day: &str, description: &str) -> Result<PathBuf> {
        let api_key = self.api_key.as_deref().context("No API key for avatar generation")?;
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&ImageRequest {
                model: &self.model,
                prompt: description,
                size: "1024x1024",
                n: 1,
            })
            .send()
            .await
            .context("Image request failed")?
            .error_for_status()
            .context("Image endpoint returned an error")?;

        let body: ImageResponse = response.json().await.context("Malformed image response")?;
        let url = body
            .data
            .into_iter()
            .find_map(|d| d.url)
            .context("Image response carried no url")?;

        let bytes = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .context("Image download failed")?
            .bytes()
            .await
            .context("Image download interrupted")?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        let path = self.output_dir.join(format!("{user_id}_{day}.png"));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

#[async_trait]
impl AvatarImageGenerator for HttpAvatarImageGenerator {
    async fn generate(&self, user_id: &str, day: &str, description: &str) -> Option<PathBuf> {
        match self.try_generate(user_id, day, description).await {
            Ok(path) => {
                info!(user_id, day, path = %path.display(), "Avatar image generated");
                Some(path)
            }
            Err(e) => {
                error!(user_id, day, error = %format!("{e:#}"), "Avatar generation failed");
                None
            }
        }
    }
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u8,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_generates_and_saves_png() {
        let mut server = mockito::Server::new_async().await;
        let image_url = format!("{}/img/1.png", server.url());
        let api = server
            .mock("POST", "/v1/images/generations")
            .with_status(200)
            .with_body(json!({"data": [{"url": image_url}]}).to_string())
            .create_async()
            .await;
        let download = server
            .mock("GET", "/img/1.png")
            .with_status(200)
            .with_body([0x89, b'P', b'N', b'G'])
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = AvatarConfig {
            enabled: true,
            endpoint: format!("{}/v1/images/generations", server.url()),
            model: "test".to_string(),
            output_dir: dir.path().to_string_lossy().into_owned(),
        };
        let generator = HttpAvatarImageGenerator::new(&config, Some("k".to_string())).unwrap();
        let path = generator.generate("u1", "2026-02-08", "calm").await.unwrap();

        assert_eq!(path, dir.path().join("u1_2026-02-08.png"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0x89, b'P', b'N', b'G']);
        api.assert_async().await;
        download.assert_async().await;
    }

    #[tokio::test]
    async fn test_failures_yield_none() {
        let mut server = mockito::Server::new_async().await;
        let _api = server
            .mock("POST", "/v1/images/generations")
            .with_status(500)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let config = AvatarConfig {
            enabled: true,
            endpoint: format!("{}/v1/images/generations", server.url()),
            model: "test".to_string(),
            output_dir: dir.path().to_string_lossy().into_owned(),
        };

        let generator = HttpAvatarImageGenerator::new(&config, Some("k".to_string())).unwrap();
        assert!(generator.generate("u1", "2026-02-08", "calm").await.is_none());

        let keyless = HttpAvatarImageGenerator::new(&config, None).unwrap();
        assert!(keyless.generate("u1", "2026-02-08", "calm").await.is_none());
    }
}
