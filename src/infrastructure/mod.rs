//! Infrastructure layer module
//!
//! Process-level concerns that sit outside the domain:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//!
//! Persistence and external integrations live under `adapters`.

pub mod config;
pub mod logging;
