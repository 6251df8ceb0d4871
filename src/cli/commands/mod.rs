//! CLI command implementations.

pub mod ask;
pub mod daily;
pub mod init;
pub mod memory;
pub mod mood;
pub mod session;

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

/// Read a JSON document from `path`, or from stdin when `path` is `-`.
pub(crate) async fn read_json_input<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}
