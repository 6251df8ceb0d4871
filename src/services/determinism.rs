//! Deterministic-mode enforcement for injected capabilities.

use tracing::error;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{IdProvider, LlmBridge, TimeProvider};

/// Environment switch that forces deterministic mode regardless of config.
pub const DETERMINISTIC_ENV: &str = "REFLECTO_DETERMINISTIC";

/// Refuses ambient clocks, random ids and unsafe LLM bridges in
/// deterministic mode. Outside it every check passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeterminismGuard {
    deterministic: bool,
}

impl DeterminismGuard {
    pub const fn new(deterministic: bool) -> Self {
        Self { deterministic }
    }

    /// Config flag, or `REFLECTO_DETERMINISTIC=1` in the environment.
    pub fn from_config(deterministic: bool) -> Self {
        let forced = std::env::var(DETERMINISTIC_ENV).is_ok_and(|v| v == "1");
        Self::new(deterministic || forced)
    }

    pub const fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Both providers must be present and neither may be ambient.
    pub fn check_providers(
        &self,
        time: Option<&dyn TimeProvider>,
        ids: Option<&dyn IdProvider>,
    ) -> DomainResult<()> {
        if !self.deterministic {
            return Ok(());
        }
        let explicit = time.is_some_and(|t| !t.is_ambient()) && ids.is_some_and(|i| !i.is_ambient());
        if explicit {
            Ok(())
        } else {
            error!("Deterministic mode invoked without explicit time and id providers");
            Err(DomainError::DeterministicProviderViolation)
        }
    }

    pub fn check_llm(&self, bridge: &dyn LlmBridge) -> DomainResult<()> {
        if self.deterministic && !bridge.deterministic_safe() {
            error!(bridge = bridge.name(), "Non-deterministic LLM bridge blocked");
            return Err(DomainError::DeterministicLlmViolation(bridge.name().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::LlmError;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    struct Clock(bool);

    impl TimeProvider for Clock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::<Utc>::UNIX_EPOCH
        }

        fn is_ambient(&self) -> bool {
            self.0
        }
    }

    struct Ids;

    impl IdProvider for Ids {
        fn new_id(&self) -> String {
            "id".to_string()
        }
    }

    struct Bridge(bool);

    #[async_trait]
    impl LlmBridge for Bridge {
        fn name(&self) -> &str {
            "bridge"
        }

        fn deterministic_safe(&self) -> bool {
            self.0
        }

        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            Ok(prompt.to_string())
        }
    }

    #[test]
    fn test_relaxed_mode_allows_everything() {
        let guard = DeterminismGuard::new(false);
        assert!(guard.check_providers(None, None).is_ok());
        assert!(guard.check_llm(&Bridge(false)).is_ok());
    }

    #[test]
    fn test_missing_or_ambient_providers_rejected() {
        let guard = DeterminismGuard::new(true);
        assert_eq!(
            guard.check_providers(None, Some(&Ids)),
            Err(DomainError::DeterministicProviderViolation)
        );
        assert_eq!(
            guard.check_providers(Some(&Clock(true)), Some(&Ids)),
            Err(DomainError::DeterministicProviderViolation)
        );
        assert!(guard.check_providers(Some(&Clock(false)), Some(&Ids)).is_ok());
    }

    #[test]
    fn test_unsafe_bridge_rejected() {
        let guard = DeterminismGuard::new(true);
        let err = guard.check_llm(&Bridge(false)).unwrap_err();
        assert!(err.is_determinism_violation());
        assert!(guard.check_llm(&Bridge(true)).is_ok());
    }

    #[test]
    fn test_env_forces_mode() {
        temp_env::with_var(DETERMINISTIC_ENV, Some("1"), || {
            assert!(DeterminismGuard::from_config(false).is_deterministic());
        });
        temp_env::with_var(DETERMINISTIC_ENV, None::<&str>, || {
            assert!(!DeterminismGuard::from_config(false).is_deterministic());
        });
    }
}
