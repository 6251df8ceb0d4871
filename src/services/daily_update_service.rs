//! Loads a user-day, runs the daily update and persists what it derives.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::daily_update::{
    avatar_description, build_reflection_prompt, run_daily_update, DailyUpdate, STREAK_WINDOW_DAYS,
};
use super::determinism::DeterminismGuard;
use crate::domain::errors::DomainResult;
use crate::domain::ports::{
    AvatarImageGenerator, DailyRepository, IdentityStore, LlmBridge, PromptStore, SessionRepository,
};

/// Result of a daily update run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUpdateReport {
    #[serde(flatten)]
    pub update: DailyUpdate,
    pub reflection_prompt: String,
    /// Generated reflection text, when a bridge is configured and succeeded.
    pub reflection: Option<String>,
    /// Path of a generated avatar image, when a generator is configured and succeeded.
    pub avatar_image: Option<String>,
}

pub struct DailyUpdateService {
    sessions: Arc<dyn SessionRepository>,
    daily: Arc<dyn DailyRepository>,
    identities: Arc<dyn IdentityStore>,
    prompts: Arc<dyn PromptStore>,
    guard: DeterminismGuard,
    llm: Option<Arc<dyn LlmBridge>>,
    avatar_images: Option<Arc<dyn AvatarImageGenerator>>,
}

impl DailyUpdateService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        daily: Arc<dyn DailyRepository>,
        identities: Arc<dyn IdentityStore>,
        prompts: Arc<dyn PromptStore>,
        guard: DeterminismGuard,
    ) -> Self {
        Self {
            sessions,
            daily,
            identities,
            prompts,
            guard,
            llm: None,
            avatar_images: None,
        }
    }

    #[must_use]
    pub fn with_llm(mut self, llm: Arc<dyn LlmBridge>) -> Self {
        self.llm = Some(llm);
        self
    }

    #[must_use]
    pub fn with_avatar_images(mut self, generator: Arc<dyn AvatarImageGenerator>) -> Self {
        self.avatar_images = Some(generator);
        self
    }

    /// Run the update for `(user_id, day)`.
    ///
    /// Re-running for the same day with the same journal overwrites the stored
    /// snapshot and avatar state with identical values. The identity is folded
    /// again, so evidence keeps accumulating.
    #[instrument(skip(self), fields(user_id = %user_id, day = %day))]
    pub async fn run(&self, user_id: &str, day: &str) -> DomainResult<DailyUpdateReport> {
        // Fail before writing anything if the bridge is not allowed.
        if let Some(llm) = &self.llm {
            self.guard.check_llm(llm.as_ref())?;
        }

        let events = self.sessions.events_for_user_day(user_id, day).await?;
        let limit = u32::try_from(STREAK_WINDOW_DAYS).unwrap_or(u32::MAX);
        let previous = self.daily.list_snapshots(user_id, day, limit).await?;
        let previous_avatar = self.daily.get_avatar_state(user_id).await?;
        let identity = self.identities.load_identity(user_id).await?;

        let update = run_daily_update(day, &events, &previous, previous_avatar.as_ref(), &identity);

        self.daily.upsert_snapshot(user_id, day, &update.snapshot).await?;
        self.daily
            .upsert_avatar_state(user_id, &update.avatar_state)
            .await?;
        self.identities.save_identity(user_id, &update.identity).await?;

        let bundle = self.prompts.load_bundle().await?;
        let reflection_prompt =
            build_reflection_prompt(&bundle, &update.snapshot, &update.avatar_state);

        let reflection = match &self.llm {
            Some(llm) => match llm.generate(&reflection_prompt).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(bridge = llm.name(), error = %e, "Reflection generation failed");
                    None
                }
            },
            None => None,
        };

        let avatar_image = match &self.avatar_images {
            Some(generator) => generator
                .generate(user_id, day, &avatar_description(&update.avatar_state))
                .await
                .map(|p| p.to_string_lossy().into_owned()),
            None => None,
        };

        info!(
            events = events.len(),
            streak = update.streak,
            mood = %update.avatar_state.mood,
            "Daily update complete"
        );
        Ok(DailyUpdateReport {
            update,
            reflection_prompt,
            reflection,
            avatar_image,
        })
    }
}
