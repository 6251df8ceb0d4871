//! SQLite implementation of the SessionRepository trait.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::domain::errors::DomainError;
use crate::domain::models::{EventType, SessionEvent, SessionRecord};
use crate::domain::ports::SessionRepository;

const EVENT_COLUMNS: &str =
    "id, session_id, timestamp, event_index, type, payload, source, event_hash, prev_hash";

/// SQLite-backed session store and event journal.
#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn save(&self, record: SessionRecord) -> Result<String> {
        insert_session(&self.pool, &record).await?;
        Ok(record.id)
    }

    async fn save_with_events(&self, record: SessionRecord, events: Vec<SessionEvent>) -> Result<String> {
        let mut tx = self.pool.begin().await.context("Failed to begin session transaction")?;
        insert_session(&mut *tx, &record).await?;
        for event in &events {
            insert_event(&mut *tx, event).await?;
        }
        tx.commit()
            .await
            .with_context(|| format!("Failed to commit session {}", record.id))?;
        Ok(record.id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, created_at, data, version FROM sessions WHERE id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch session")?;

        Ok(row.map(SessionRecord::try_from).transpose()?)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SessionRecord>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, created_at, data, version FROM sessions
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list sessions")?;

        Ok(rows
            .into_iter()
            .map(SessionRecord::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn append_event(&self, event: SessionEvent) -> Result<()> {
        insert_event(&self.pool, &event).await
    }

    async fn get_events(&self, session_id: &str) -> Result<Vec<SessionEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM session_events WHERE session_id = ? ORDER BY seq ASC"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch session events")?;

        Ok(rows
            .into_iter()
            .map(SessionEvent::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn last_event(&self, session_id: &str) -> Result<Option<SessionEvent>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM session_events WHERE session_id = ? ORDER BY seq DESC LIMIT 1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch last session event")?;

        Ok(row.map(SessionEvent::try_from).transpose()?)
    }

    async fn events_for_user_day(&self, user_id: &str, day: &str) -> Result<Vec<SessionEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT e.id, e.session_id, e.timestamp, e.event_index, e.type, e.payload,
                   e.source, e.event_hash, e.prev_hash
            FROM session_events e
            JOIN sessions s ON s.id = e.session_id
            WHERE s.user_id = ? AND substr(e.timestamp, 1, 10) = ?
            ORDER BY e.seq ASC
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch events for day")?;

        Ok(rows
            .into_iter()
            .map(SessionEvent::try_from)
            .collect::<Result<_, _>>()?)
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    created_at: String,
    data: String,
    version: String,
}

impl TryFrom<SessionRow> for SessionRecord {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            data: serde_json::from_str(&row.data)?,
            version: row.version,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    session_id: String,
    timestamp: String,
    event_index: i64,
    #[sqlx(rename = "type")]
    event_type: String,
    payload: String,
    source: String,
    event_hash: Option<String>,
    prev_hash: Option<String>,
}

impl TryFrom<EventRow> for SessionEvent {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            session_id: row.session_id,
            timestamp: row.timestamp,
            event_index: u64::try_from(row.event_index)
                .map_err(|e| DomainError::SerializationError(e.to_string()))?,
            event_type: row.event_type.parse::<EventType>()?,
            payload: serde_json::from_str(&row.payload)?,
            source: row.source,
            event_hash: row.event_hash,
            prev_hash: row.prev_hash,
        })
    }
}

async fn insert_session<'e, E>(executor: E, record: &SessionRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let data = serde_json::to_string(&record.data).context("Failed to serialize session data")?;

    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, created_at, data, version)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.user_id)
    .bind(&record.created_at)
    .bind(data)
    .bind(&record.version)
    .execute(executor)
    .await
    .with_context(|| format!("Failed to insert session {}", record.id))?;

    Ok(())
}

async fn insert_event<'e, E>(executor: E, event: &SessionEvent) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let payload = serde_json::to_string(&event.payload).context("Failed to serialize event payload")?;

    sqlx::query(
        r#"
        INSERT INTO session_events
            (id, session_id, timestamp, event_index, type, payload, source, event_hash, prev_hash)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.id)
    .bind(&event.session_id)
    .bind(&event.timestamp)
    .bind(i64::try_from(event.event_index).context("event_index out of range")?)
    .bind(event.event_type.as_str())
    .bind(payload)
    .bind(&event.source)
    .bind(&event.event_hash)
    .bind(&event.prev_hash)
    .execute(executor)
    .await
    .with_context(|| {
        format!(
            "Failed to append event {} to session {}",
            event.event_index, event.session_id
        )
    })?;

    Ok(())
}
