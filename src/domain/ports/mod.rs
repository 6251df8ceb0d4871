//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - SessionRepository / DailyRepository: journal and derived-state storage
//! - IdentityStore / MemoryStore: per-user profile files
//! - PromptStore: avatar prompt templates
//! - LlmBridge: optional text generation
//! - ActionStore: live session actions
//! - AvatarImageGenerator: best-effort image generation
//! - TimeProvider / IdProvider: injected clock and id source

pub mod action_store;
pub mod avatar_image;
pub mod daily_repository;
pub mod llm_bridge;
pub mod profile_store;
pub mod prompt_store;
pub mod providers;
pub mod session_repository;

pub use action_store::ActionStore;
pub use avatar_image::AvatarImageGenerator;
pub use daily_repository::DailyRepository;
pub use llm_bridge::{LlmBridge, LlmError};
pub use profile_store::{IdentityStore, MemoryStore};
pub use prompt_store::{PromptBundle, PromptStore};
pub use providers::{IdProvider, TimeProvider};
pub use session_repository::SessionRepository;
