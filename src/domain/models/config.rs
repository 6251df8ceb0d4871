use serde::{Deserialize, Serialize};

/// Main configuration structure for Reflecto
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Determinism guards
    #[serde(default)]
    pub determinism: DeterminismConfig,

    /// Event journal options
    #[serde(default)]
    pub journal: JournalConfig,

    /// Live stream intervals and registry lifecycle
    #[serde(default)]
    pub streaming: StreamingConfig,

    /// File-backed stores
    #[serde(default)]
    pub stores: StoresConfig,

    /// LLM bridge
    #[serde(default)]
    pub llm: LlmConfig,

    /// Avatar image generation
    #[serde(default)]
    pub avatar: AvatarConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".reflecto/reflecto.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation policy for file output: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Determinism configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeterminismConfig {
    /// Forbid ambient clocks, random ids and unsafe LLM bridges
    #[serde(default)]
    pub deterministic: bool,

    /// RFC 3339 instant served by a fixed clock instead of the system clock
    #[serde(default)]
    pub fixed_time: Option<String>,

    /// Prefix for sequential ids (`<prefix>1`, `<prefix>2`, ...) instead of UUIDs
    #[serde(default)]
    pub id_prefix: Option<String>,
}

/// Event journal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JournalConfig {
    /// Interleave `timeline_phase` markers into fresh session journals
    #[serde(default)]
    pub timeline_phases: bool,

    /// Source tag written on each event
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    "session_service".to_string()
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            timeline_phases: false,
            source: default_source(),
        }
    }
}

/// Streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamingConfig {
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,

    #[serde(default = "default_presence_secs")]
    pub presence_secs: u64,

    #[serde(default = "default_skills_secs")]
    pub skills_secs: u64,

    #[serde(default = "default_time_of_day_secs")]
    pub time_of_day_secs: u64,

    /// Seconds after which an unused registry entry is reclaimed
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

const fn default_heartbeat_secs() -> u64 {
    3
}

const fn default_presence_secs() -> u64 {
    3
}

const fn default_skills_secs() -> u64 {
    5
}

const fn default_time_of_day_secs() -> u64 {
    10
}

const fn default_idle_timeout_secs() -> u64 {
    300
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            heartbeat_secs: default_heartbeat_secs(),
            presence_secs: default_presence_secs(),
            skills_secs: default_skills_secs(),
            time_of_day_secs: default_time_of_day_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

/// File store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoresConfig {
    /// Directory holding `{user_id}_identity.json` and `{user_id}_memory.json`
    #[serde(default = "default_profile_dir")]
    pub profile_dir: String,

    /// Directory holding prompt templates
    #[serde(default = "default_prompt_dir")]
    pub prompt_dir: String,
}

fn default_profile_dir() -> String {
    ".reflecto/profiles".to_string()
}

fn default_prompt_dir() -> String {
    ".reflecto/prompts".to_string()
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self {
            profile_dir: default_profile_dir(),
            prompt_dir: default_prompt_dir(),
        }
    }
}

/// LLM bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// Bridge to use: "mock", "http" or "none"
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Chat completions endpoint
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Requests per second allowed against the endpoint
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_llm_provider() -> String {
    "none".to_string()
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_requests_per_second() -> u32 {
    2
}

const fn default_max_retries() -> u32 {
    3
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
            max_retries: default_max_retries(),
        }
    }
}

/// Avatar image generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AvatarConfig {
    /// Generate an image after each daily update
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_avatar_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_avatar_model")]
    pub model: String,

    /// Directory where generated images are written
    #[serde(default = "default_avatar_dir")]
    pub output_dir: String,
}

fn default_avatar_endpoint() -> String {
    "https://api.openai.com/v1/images/generations".to_string()
}

fn default_avatar_model() -> String {
    "dall-e-3".to_string()
}

fn default_avatar_dir() -> String {
    ".reflecto/avatars".to_string()
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_avatar_endpoint(),
            model: default_avatar_model(),
            output_dir: default_avatar_dir(),
        }
    }
}
