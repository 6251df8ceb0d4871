//! Infrastructure adapters for external systems.

pub mod avatar;
pub mod llm;
pub mod providers;
pub mod sqlite;
pub mod stores;
