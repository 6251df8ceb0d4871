//! Composition root: wires configuration into adapters and services.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::adapters::avatar::HttpAvatarImageGenerator;
use crate::adapters::llm::bridge_from_config;
use crate::adapters::providers::providers_from_config;
use crate::adapters::sqlite::{initialize_from_config, SqliteDailyRepository, SqliteSessionRepository};
use crate::adapters::stores::{FileIdentityStore, FilePromptStore};
use crate::domain::models::Config;
use crate::domain::ports::{IdProvider, LlmBridge, SessionRepository, TimeProvider};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{
    DailyUpdateService, DeterminismGuard, SessionService, StreamRegistry, StreamingService,
};

/// Load from `path` when given, otherwise the project hierarchy.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Shared handles for one CLI invocation.
pub struct AppContext {
    pub config: Config,
    pub pool: SqlitePool,
    pub guard: DeterminismGuard,
    pub time: Arc<dyn TimeProvider>,
    pub ids: Arc<dyn IdProvider>,
    pub repository: Arc<dyn SessionRepository>,
    pub registry: Arc<StreamRegistry>,
    pub sessions: Arc<SessionService>,
}

impl AppContext {
    /// Open the database and build the session services.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = initialize_from_config(&config.database)
            .await
            .with_context(|| format!("Failed to open database at {}", config.database.path))?;

        let guard = DeterminismGuard::from_config(config.determinism.deterministic);
        let (time, ids) = providers_from_config(&config.determinism)?;
        let repository: Arc<dyn SessionRepository> =
            Arc::new(SqliteSessionRepository::new(pool.clone()));
        let prompts = Arc::new(FilePromptStore::new(&config.stores.prompt_dir));
        let registry = Arc::new(StreamRegistry::new(Duration::from_secs(
            config.streaming.idle_timeout_secs,
        )));

        let sessions = Arc::new(SessionService::new(
            Arc::clone(&repository),
            prompts,
            Arc::clone(&time),
            Arc::clone(&ids),
            guard,
            config.journal.clone(),
        ));

        Ok(Self {
            config: config.clone(),
            pool,
            guard,
            time,
            ids,
            repository,
            registry,
            sessions,
        })
    }

    pub fn streaming(&self) -> StreamingService {
        StreamingService::new(Arc::clone(&self.repository), Arc::clone(&self.registry))
    }

    /// Daily update wired with the optional LLM bridge and image generator.
    pub fn daily_update(&self) -> Result<DailyUpdateService> {
        let stores = &self.config.stores;
        let mut service = DailyUpdateService::new(
            Arc::clone(&self.repository),
            Arc::new(SqliteDailyRepository::new(self.pool.clone())),
            Arc::new(FileIdentityStore::new(&stores.profile_dir)),
            Arc::new(FilePromptStore::new(&stores.prompt_dir)),
            self.guard,
        );
        if let Some(llm) = llm_bridge(&self.config)? {
            service = service.with_llm(llm);
        }
        if self.config.avatar.enabled {
            let api_key = std::env::var(&self.config.llm.api_key_env).ok();
            let generator = HttpAvatarImageGenerator::new(&self.config.avatar, api_key)
                .context("Failed to build avatar image generator")?;
            service = service.with_avatar_images(Arc::new(generator));
        }
        Ok(service)
    }
}

/// The configured LLM bridge, if any.
pub fn llm_bridge(config: &Config) -> Result<Option<Arc<dyn LlmBridge>>> {
    bridge_from_config(&config.llm).context("Failed to configure LLM bridge")
}
