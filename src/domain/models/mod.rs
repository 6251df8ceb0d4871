pub mod action;
pub mod config;
pub mod daily_state;
pub mod memory;
pub mod phases;
pub mod session;
pub mod snapshot;

pub use action::{Action, ActionType, LivePresence, LiveState, TimeOfDay};
pub use config::{
    AvatarConfig, Config, DatabaseConfig, DeterminismConfig, JournalConfig, LlmConfig,
    LoggingConfig, StoresConfig, StreamingConfig,
};
pub use daily_state::{DailyState, DailyStateBuilder};
pub use memory::{
    HistoryEntry, Identity, MemoryPatterns, PatternSet, RollingMemory, Trend, IDENTITY_CATEGORIES,
};
pub use phases::{
    ClosingDescriptor, ClosureStyle, ContinuityDescriptor, EmotionalTone, EnergyLevel, Expression,
    Pacing, PauseType, PresenceDescriptor, PresenceStyle, RecallStyle, SilenceDescriptor, Voice,
    VoiceResult,
};
pub use session::{
    ChainVerification, EventType, FlowContext, InputVerification, ReplayEnvelope, SessionEvent,
    SessionMeta, SessionOutput, SessionRecord, SessionRequest, REFLECTO_VERSION, SESSION_SOURCE,
};
pub use snapshot::{default_skills, AvatarMood, AvatarState, DailySnapshot, AVATAR_STATE_VERSION};
