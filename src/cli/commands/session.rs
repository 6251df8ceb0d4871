//! Session CLI commands: create, replay, verify and stream journals.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use futures::StreamExt;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use tracing::warn;

use super::read_json_input;
use crate::adapters::stores::InMemoryActionStore;
use crate::cli::context::AppContext;
use crate::cli::output::{output, table, truncate, CommandOutput};
use crate::domain::errors::DomainError;
use crate::domain::models::{
    Action, ChainVerification, Config, InputVerification, ReplayEnvelope, SessionEvent,
    SessionRecord, SessionRequest,
};
use crate::domain::ports::ActionStore;
use crate::services::{CreatedSession, LiveEmitter, StreamingService};

#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Run the reflection pipeline and store a new session
    Create {
        /// User the session belongs to
        user_id: String,
        /// Request JSON file ({user_state, history, flow_context, raw_response}); "-" for stdin
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Open an empty session for live emission
    Start {
        /// User the session belongs to
        user_id: String,
    },
    /// Show a stored session record
    Show {
        /// Session ID
        session_id: String,
        /// Include the event journal
        #[arg(long)]
        events: bool,
    },
    /// List a user's sessions, newest first
    List {
        /// User ID
        user_id: String,
    },
    /// Print the stored output without recomputing it
    Replay {
        /// Session ID
        session_id: String,
    },
    /// Verify the session's event hash chain
    Verify {
        /// Session ID
        session_id: String,
    },
    /// Check a request against the session's stored input hash
    VerifyInput {
        /// Session ID
        session_id: String,
        /// Request JSON file; "-" for stdin
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Write the journal as server-sent event frames
    Stream {
        /// Session ID
        session_id: String,
        /// Keep following live events until `done` or Ctrl-C
        #[arg(short, long)]
        follow: bool,
    },
    /// Emit live heartbeat, presence, skills and time-of-day events and stream them
    Live {
        /// Session ID (from `session start`)
        session_id: String,
        /// Close the session with `done` after this many events
        #[arg(short, long)]
        max_events: Option<u64>,
        /// JSON array of logged actions to derive presence and skills from
        #[arg(short, long)]
        actions: Option<PathBuf>,
    },
}

impl CommandOutput for CreatedSession {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Session {} created", self.session_id)];
        lines.push(format!("Presence: {}", self.session.presence.presence_style));
        lines.push("Questions:".to_string());
        for question in &self.session.questions {
            lines.push(format!("  - {question}"));
        }
        if let Some(response) = &self.session.response {
            lines.push(format!("Response: {response}"));
        }
        if let Some(phrase) = &self.session.continuity_phrase {
            lines.push(format!("Continuity: {phrase}"));
        }
        if let Some(phrase) = &self.session.closing_phrase {
            lines.push(format!("Closing: {phrase}"));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct StartedSession {
    pub session_id: String,
    pub user_id: String,
}

impl CommandOutput for StartedSession {
    fn to_human(&self) -> String {
        format!("Session {} started for {}", self.session_id, self.user_id)
    }
}

#[derive(Debug, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub record: SessionRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<SessionEvent>>,
}

impl CommandOutput for SessionDetail {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Session:  {}", self.record.id),
            format!("User:     {}", self.record.user_id),
            format!("Created:  {}", self.record.created_at),
            format!("Version:  {}", self.record.version),
            String::new(),
            serde_json::to_string_pretty(&self.record.data).unwrap_or_default(),
        ];
        if let Some(events) = &self.events {
            let mut t = table(&["#", "Type", "Timestamp", "Hash"]);
            for event in events {
                t.add_row(vec![
                    event.event_index.to_string(),
                    event.event_type.to_string(),
                    event.timestamp.clone(),
                    truncate(event.event_hash.as_deref().unwrap_or("-"), 19),
                ]);
            }
            lines.push(String::new());
            lines.push(t.to_string());
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct SessionList {
    pub user_id: String,
    pub sessions: Vec<SessionRecord>,
}

impl CommandOutput for SessionList {
    fn to_human(&self) -> String {
        if self.sessions.is_empty() {
            return format!("No sessions found for {}.", self.user_id);
        }
        let mut t = table(&["ID", "Created", "Version", "Response"]);
        for session in &self.sessions {
            let response = session
                .data
                .get("response")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("-");
            t.add_row(vec![
                session.id.clone(),
                session.created_at.clone(),
                session.version.clone(),
                truncate(response, 48),
            ]);
        }
        format!("{t}\n\nShowing {} session(s)", self.sessions.len())
    }
}

impl CommandOutput for ReplayEnvelope {
    fn to_human(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl CommandOutput for ChainVerification {
    fn to_human(&self) -> String {
        if self.valid {
            return format!("Event chain for {} is valid.", self.session_id);
        }
        format!(
            "Event chain for {} is BROKEN at index {}\n  expected: {}\n  computed: {}",
            self.session_id,
            self.index.map_or_else(|| "?".to_string(), |i| i.to_string()),
            self.expected.as_deref().unwrap_or("-"),
            self.computed.as_deref().unwrap_or("-"),
        )
    }
}

impl CommandOutput for InputVerification {
    fn to_human(&self) -> String {
        let verdict = if self.matches { "matches" } else { "does NOT match" };
        format!(
            "Input {verdict} session {}\n  stored:   {}\n  computed: {} ({})",
            self.session_id,
            self.stored_hash.as_deref().unwrap_or("-"),
            self.computed_hash,
            self.algorithm,
        )
    }
}

pub async fn execute(args: SessionArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;

    match args.command {
        SessionCommands::Create { user_id, input } => {
            let request: SessionRequest = read_json_input(&input).await?;
            let created = ctx.sessions.create_session(&user_id, &request).await?;
            output(&created, json_mode);
        }
        SessionCommands::Start { user_id } => {
            let session_id = ctx.sessions.start_session(&user_id).await?;
            output(&StartedSession { session_id, user_id }, json_mode);
        }
        SessionCommands::Show { session_id, events } => {
            let record = ctx
                .sessions
                .get_session(&session_id)
                .await?
                .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))?;
            let events = if events {
                Some(ctx.sessions.events(&session_id).await?)
            } else {
                None
            };
            output(&SessionDetail { record, events }, json_mode);
        }
        SessionCommands::List { user_id } => {
            let sessions = ctx.sessions.list_sessions(&user_id).await?;
            output(&SessionList { user_id, sessions }, json_mode);
        }
        SessionCommands::Replay { session_id } => {
            let envelope = ctx.sessions.require_replay(&session_id).await?;
            output(&envelope, json_mode);
        }
        SessionCommands::Verify { session_id } => {
            let verification = ctx.sessions.verify_event_chain(&session_id).await?;
            output(&verification, json_mode);
        }
        SessionCommands::VerifyInput { session_id, input } => {
            let request: SessionRequest = read_json_input(&input).await?;
            let verification = ctx
                .sessions
                .verify_session_input(&session_id, &request)
                .await?
                .ok_or_else(|| DomainError::SessionNotFound(session_id.clone()))?;
            output(&verification, json_mode);
        }
        SessionCommands::Stream { session_id, follow } => {
            require_session(&ctx, &session_id).await?;
            let streaming = ctx.streaming();
            if follow {
                let (shutdown_tx, _) = broadcast::channel(1);
                spawn_ctrl_c(shutdown_tx.clone());
                write_stream(&streaming, &session_id, &shutdown_tx).await?;
            } else {
                let mut stdout = tokio::io::stdout();
                for frame in streaming.replay_frames(&session_id).await? {
                    stdout.write_all(frame.as_bytes()).await?;
                }
                stdout.flush().await?;
            }
        }
        SessionCommands::Live {
            session_id,
            max_events,
            actions,
        } => {
            require_session(&ctx, &session_id).await?;
            let store = Arc::new(InMemoryActionStore::new());
            if let Some(path) = actions {
                let logged: Vec<Action> = read_json_input(&path).await?;
                for action in logged {
                    store.add_action(&session_id, action).await?;
                }
            }
            run_live(&ctx, &session_id, store, max_events).await?;
        }
    }

    Ok(())
}

async fn require_session(ctx: &AppContext, session_id: &str) -> Result<()> {
    if ctx.sessions.get_session(session_id).await?.is_none() {
        return Err(DomainError::SessionNotFound(session_id.to_string()).into());
    }
    Ok(())
}

/// Broadcast shutdown on the first Ctrl-C.
fn spawn_ctrl_c(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });
}

async fn write_stream(
    streaming: &StreamingService,
    session_id: &str,
    shutdown_tx: &broadcast::Sender<()>,
) -> Result<()> {
    let mut frames = Box::pin(streaming.stream(session_id, shutdown_tx.subscribe()));
    let mut stdout = tokio::io::stdout();
    while let Some(frame) = frames.next().await {
        stdout.write_all(frame?.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

/// Run the emitter and stream its frames to stdout in the same process.
async fn run_live(
    ctx: &AppContext,
    session_id: &str,
    actions: Arc<dyn ActionStore>,
    max_events: Option<u64>,
) -> Result<()> {
    let (shutdown_tx, _) = broadcast::channel(1);
    spawn_ctrl_c(shutdown_tx.clone());
    let reaper = ctx.registry.spawn_reaper(
        std::time::Duration::from_secs(ctx.config.streaming.idle_timeout_secs),
        shutdown_tx.subscribe(),
    );

    let emitter = LiveEmitter::new(
        Arc::clone(&ctx.sessions),
        actions,
        Arc::clone(&ctx.registry),
        Arc::clone(&ctx.time),
        ctx.config.streaming.clone(),
    );
    let emitter_shutdown = shutdown_tx.subscribe();
    let id = session_id.to_string();
    let emission = tokio::spawn(async move { emitter.run(&id, emitter_shutdown, max_events).await });

    let streaming = ctx.streaming();
    let streamed = write_stream(&streaming, session_id, &shutdown_tx).await;

    let _ = shutdown_tx.send(());
    match emission.await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!(error = %e, "Live emission ended with error"),
        Err(e) => warn!(error = %e, "Live emission task failed"),
    }
    reaper.await.context("Registry reaper task failed")?;
    streamed
}
