//! File-backed and in-memory stores for profiles, prompts and actions.

pub mod action_memory;
pub mod json_file;
pub mod prompt_file;

pub use action_memory::InMemoryActionStore;
pub use json_file::{FileIdentityStore, FileMemoryStore};
pub use prompt_file::{FilePromptStore, StaticPromptStore};
