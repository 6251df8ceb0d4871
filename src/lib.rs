//! Reflecto - deterministic daily reflection pipeline
//!
//! Reflecto turns a day's self-reported state and recent history into a
//! gentle reflection session, journals every session as a hash-chained event
//! log that can be replayed and verified, and folds each day's journal into
//! snapshots, streaks, an evolving avatar and a crystallized identity.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): value types, errors and port traits
//! - **Service Layer** (`services`): the pure pipeline plus session, streaming and daily-update services
//! - **Adapters** (`adapters`): SQLite repositories, file stores, LLM and image bridges
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use reflecto::services::run_reflection;
//!
//! let reflection = run_reflection(&request, &prompts)?;
//! println!("{}", reflection.to_output().avatar_prompt);
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, DailySnapshot, DailyState, EventType, Identity, SessionEvent, SessionOutput,
    SessionRecord, SessionRequest,
};
pub use domain::ports::{
    DailyRepository, IdProvider, LlmBridge, PromptStore, SessionRepository, TimeProvider,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    run_daily_update, run_reflection, DailyUpdateService, DeterminismGuard, SessionService,
    StreamingService,
};
