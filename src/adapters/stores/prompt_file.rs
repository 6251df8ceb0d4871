//! Prompt template stores.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::domain::ports::{PromptBundle, PromptStore};

/// Reads `<dir>/avatar/{identity,context,daily_state,style_rules,purpose}.txt`.
///
/// A missing section file reads as an empty string.
#[derive(Debug, Clone)]
pub struct FilePromptStore {
    dir: PathBuf,
}

impl FilePromptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn section(&self, name: &str) -> Result<String> {
        let path = self.dir.join("avatar").join(format!("{name}.txt"));
        read_optional(&path).await
    }
}

async fn read_optional(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read prompt {}", path.display())),
    }
}

#[async_trait]
impl PromptStore for FilePromptStore {
    async fn load_bundle(&self) -> Result<PromptBundle> {
        Ok(PromptBundle {
            identity: self.section("identity").await?,
            context: self.section("context").await?,
            daily_state: self.section("daily_state").await?,
            style_rules: self.section("style_rules").await?,
            purpose: self.section("purpose").await?,
        })
    }
}

/// Serves a bundle held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticPromptStore {
    bundle: PromptBundle,
}

impl StaticPromptStore {
    pub const fn new(bundle: PromptBundle) -> Self {
        Self { bundle }
    }
}

#[async_trait]
impl PromptStore for StaticPromptStore {
    async fn load_bundle(&self) -> Result<PromptBundle> {
        Ok(self.bundle.clone())
    }
}
