use async_trait::async_trait;
use std::path::PathBuf;

/// External avatar image generation.
///
/// Best effort: implementations return `None` on any failure instead of
/// propagating it.
#[async_trait]
pub trait AvatarImageGenerator: Send + Sync {
    async fn generate(&self, user_id: &str, day: &str, description: &str) -> Option<PathBuf>;
}
