use crate::domain::models::{Identity, RollingMemory};
use anyhow::Result;
use async_trait::async_trait;

/// Persistence for a user's crystallized identity.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Loads the identity, or [`Identity::empty`] for an unknown user.
    async fn load_identity(&self, user_id: &str) -> Result<Identity>;

    async fn save_identity(&self, user_id: &str, identity: &Identity) -> Result<()>;
}

/// Persistence for a user's rolling memory.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Loads the memory, or an empty one for an unknown user.
    async fn load_memory(&self, user_id: &str) -> Result<RollingMemory>;

    async fn save_memory(&self, user_id: &str, memory: &RollingMemory) -> Result<()>;
}
