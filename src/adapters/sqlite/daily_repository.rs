//! SQLite implementation of the DailyRepository trait.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::models::{AvatarState, DailySnapshot};
use crate::domain::ports::DailyRepository;

/// Stores one snapshot per user-day and one current avatar state per user.
#[derive(Clone)]
pub struct SqliteDailyRepository {
    pool: SqlitePool,
}

impl SqliteDailyRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DailyRepository for SqliteDailyRepository {
    async fn upsert_snapshot(&self, user_id: &str, day: &str, snapshot: &DailySnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;

        sqlx::query(
            r#"
            INSERT INTO daily_snapshots (user_id, day, snapshot, updated_at)
            VALUES (?, ?, ?, datetime('now'))
            ON CONFLICT(user_id, day) DO UPDATE SET
                snapshot = excluded.snapshot,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(day)
        .bind(json)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert snapshot for {user_id} on {day}"))?;

        Ok(())
    }

    async fn list_snapshots(&self, user_id: &str, before_day: &str, limit: u32) -> Result<Vec<DailySnapshot>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT snapshot FROM daily_snapshots
            WHERE user_id = ? AND day < ?
            ORDER BY day DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(before_day)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list snapshots")?;

        rows.into_iter()
            .map(|(json,)| serde_json::from_str(&json).context("Stored snapshot is not valid JSON"))
            .collect()
    }

    async fn upsert_avatar_state(&self, user_id: &str, state: &AvatarState) -> Result<()> {
        let json = serde_json::to_string(state).context("Failed to serialize avatar state")?;

        sqlx::query(
            r#"
            INSERT INTO avatar_states (user_id, day, state, updated_at)
            VALUES (?, ?, ?, datetime('now'))
            ON CONFLICT(user_id) DO UPDATE SET
                day = excluded.day,
                state = excluded.state,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(&state.day)
        .bind(json)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert avatar state for {user_id}"))?;

        Ok(())
    }

    async fn get_avatar_state(&self, user_id: &str) -> Result<Option<AvatarState>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT state FROM avatar_states WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch avatar state")?;

        row.map(|(json,)| serde_json::from_str(&json).context("Stored avatar state is not valid JSON"))
            .transpose()
    }
}
