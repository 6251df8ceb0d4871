//! JSON-file identity and memory stores, one file per user.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::domain::models::{Identity, RollingMemory};
use crate::domain::ports::{IdentityStore, MemoryStore};

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => serde_json::from_str(&text)
            .map(Some)
            .with_context(|| format!("Invalid JSON in {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Write to a sibling temp file, then rename over the target.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(value).context("Failed to serialize profile")?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, text)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    debug!(path = %path.display(), "Profile file written");
    Ok(())
}

/// Rejects ids that could escape the profile directory.
fn profile_file(dir: &Path, user_id: &str, kind: &str) -> Result<PathBuf> {
    anyhow::ensure!(
        !user_id.is_empty()
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !user_id.starts_with('.'),
        "Invalid user id: {user_id:?}"
    );
    Ok(dir.join(format!("{user_id}_{kind}.json")))
}

/// Identity files at `<dir>/<user>_identity.json`.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    dir: PathBuf,
}

impl FileIdentityStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    async fn load_identity(&self, user_id: &str) -> Result<Identity> {
        let path = profile_file(&self.dir, user_id, "identity")?;
        Ok(read_json(&path).await?.unwrap_or_else(Identity::empty))
    }

    async fn save_identity(&self, user_id: &str, identity: &Identity) -> Result<()> {
        write_json(&profile_file(&self.dir, user_id, "identity")?, identity).await
    }
}

/// Rolling memory files at `<dir>/<user>_memory.json`.
#[derive(Debug, Clone)]
pub struct FileMemoryStore {
    dir: PathBuf,
}

impl FileMemoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    async fn load_memory(&self, user_id: &str) -> Result<RollingMemory> {
        let path = profile_file(&self.dir, user_id, "memory")?;
        Ok(read_json(&path).await?.unwrap_or_default())
    }

    async fn save_memory(&self, user_id: &str, memory: &RollingMemory) -> Result<()> {
        write_json(&profile_file(&self.dir, user_id, "memory")?, memory).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::DailyState;
    use crate::services::memory_intelligence::update_memory;

    #[tokio::test]
    async fn test_unknown_user_gets_empty_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(dir.path());
        let identity = store.load_identity("u1").await.unwrap();
        assert_eq!(identity, Identity::empty());
        assert_eq!(identity.traits.len(), 4);
    }

    #[tokio::test]
    async fn test_identity_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(dir.path().join("profiles"));
        let mut identity = Identity::empty();
        identity.evidence.insert("recurring_moods:steady".to_string(), 2);
        identity.last_updated = Some("2026-02-08".to_string());

        store.save_identity("u1", &identity).await.unwrap();
        assert!(dir.path().join("profiles/u1_identity.json").exists());
        assert_eq!(store.load_identity("u1").await.unwrap(), identity);
    }

    #[tokio::test]
    async fn test_memory_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        let state = DailyState::builder("2026-02-08").topic("deadline").build().unwrap();
        let memory = update_memory(&store.load_memory("u1").await.unwrap(), &state);

        store.save_memory("u1", &memory).await.unwrap();
        assert_eq!(store.load_memory("u1").await.unwrap(), memory);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(dir.path());
        assert!(store.load_identity("../etc").await.is_err());
        assert!(store.save_identity("", &Identity::empty()).await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("u1_identity.json"), "{not json").unwrap();
        let store = FileIdentityStore::new(dir.path());
        assert!(store.load_identity("u1").await.is_err());
    }
}
