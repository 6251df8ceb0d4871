use crate::domain::models::{AvatarState, DailySnapshot};
use anyhow::Result;
use async_trait::async_trait;

/// Persistence for derived per-day outputs.
#[async_trait]
pub trait DailyRepository: Send + Sync {
    /// Inserts or replaces the snapshot for `(user_id, day)`.
    async fn upsert_snapshot(&self, user_id: &str, day: &str, snapshot: &DailySnapshot) -> Result<()>;

    /// Returns up to `limit` snapshots for days strictly before `before_day`,
    /// newest day first.
    async fn list_snapshots(
        &self,
        user_id: &str,
        before_day: &str,
        limit: u32,
    ) -> Result<Vec<DailySnapshot>>;

    /// Inserts or replaces the user's current avatar state.
    async fn upsert_avatar_state(&self, user_id: &str, state: &AvatarState) -> Result<()>;

    async fn get_avatar_state(&self, user_id: &str) -> Result<Option<AvatarState>>;
}
