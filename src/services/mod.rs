//! Service layer: the pure cognition pipeline plus the services that run it
//! against storage, streams and external bridges.

pub mod avatar_prompt;
pub mod canonical;
pub mod daily_update;
pub mod daily_update_service;
pub mod determinism;
pub mod evolution;
pub mod hash_chain;
pub mod identity_crystallizer;
pub mod live_emitter;
pub mod live_presence;
pub mod memory_intelligence;
pub mod mood_scoring;
pub mod orchestrator;
pub mod pattern_engine;
pub mod phases;
pub mod question_flow;
pub mod session_service;
pub mod snapshot_builder;
pub mod stream_registry;
pub mod streaming_service;

pub use daily_update::{run_daily_update, DailyUpdate};
pub use daily_update_service::{DailyUpdateReport, DailyUpdateService};
pub use determinism::DeterminismGuard;
pub use live_emitter::LiveEmitter;
pub use mood_scoring::score_mood;
pub use orchestrator::{run_reflection, Reflection};
pub use session_service::{compute_input_hash, CreatedSession, SessionService};
pub use stream_registry::{StreamRegistry, Subscription};
pub use streaming_service::{format_sse, StreamingService};
