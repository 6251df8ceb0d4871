//! Time and id provider implementations.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DeterminismConfig;
use crate::domain::ports::{IdProvider, TimeProvider};

/// Wall clock. Ambient, so refused in deterministic mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn is_ambient(&self) -> bool {
        true
    }
}

/// Random v4 UUIDs. Ambient, so refused in deterministic mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdProvider;

impl IdProvider for UuidIdProvider {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn is_ambient(&self) -> bool {
        true
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeProvider {
    instant: DateTime<Utc>,
}

impl FixedTimeProvider {
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    pub fn parse(rfc3339: &str) -> DomainResult<Self> {
        DateTime::parse_from_rfc3339(rfc3339)
            .map(|dt| Self::new(dt.with_timezone(&Utc)))
            .map_err(|e| DomainError::ValidationFailed(format!("invalid fixed time {rfc3339}: {e}")))
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Hands out preset ids first, then `<prefix>1`, `<prefix>2`, ...
#[derive(Debug)]
pub struct SequenceIdProvider {
    prefix: String,
    preset: Mutex<VecDeque<String>>,
    counter: AtomicU64,
}

impl SequenceIdProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            preset: Mutex::new(VecDeque::new()),
            counter: AtomicU64::new(0),
        }
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preset: Mutex::new(ids.into_iter().map(Into::into).collect()),
            ..Self::new("id")
        }
    }
}

impl IdProvider for SequenceIdProvider {
    fn new_id(&self) -> String {
        let preset = self
            .preset
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());
        preset.unwrap_or_else(|| {
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            format!("{}{n}", self.prefix)
        })
    }
}

/// Providers selected by configuration: fixed ones when configured, ambient otherwise.
pub fn providers_from_config(
    config: &DeterminismConfig,
) -> DomainResult<(Arc<dyn TimeProvider>, Arc<dyn IdProvider>)> {
    let time: Arc<dyn TimeProvider> = match config.fixed_time.as_deref() {
        Some(instant) => Arc::new(FixedTimeProvider::parse(instant)?),
        None => Arc::new(SystemTimeProvider),
    };
    let ids: Arc<dyn IdProvider> = match config.id_prefix.as_deref() {
        Some(prefix) => Arc::new(SequenceIdProvider::new(prefix)),
        None => Arc::new(UuidIdProvider),
    };
    Ok((time, ids))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_time() {
        let provider = FixedTimeProvider::parse("2026-02-08T12:00:00Z").unwrap();
        assert_eq!(provider.now(), provider.now());
        assert!(!provider.is_ambient());
        assert!(FixedTimeProvider::parse("yesterday").is_err());
    }

    #[test]
    fn test_sequence_ids() {
        let provider = SequenceIdProvider::from_ids(["s1", "e1"]);
        assert_eq!(provider.new_id(), "s1");
        assert_eq!(provider.new_id(), "e1");
        assert_eq!(provider.new_id(), "id1");
        assert_eq!(provider.new_id(), "id2");
        assert!(!provider.is_ambient());
    }

    #[test]
    fn test_system_providers_are_ambient() {
        assert!(SystemTimeProvider.is_ambient());
        assert!(UuidIdProvider.is_ambient());
        assert_ne!(UuidIdProvider.new_id(), UuidIdProvider.new_id());
    }

    #[test]
    fn test_config_selection() {
        let config = DeterminismConfig {
            deterministic: true,
            fixed_time: Some("2026-02-08T12:00:00Z".to_string()),
            id_prefix: Some("r".to_string()),
        };
        let (time, ids) = providers_from_config(&config).unwrap();
        assert!(!time.is_ambient());
        assert_eq!(ids.new_id(), "r1");

        let (time, ids) = providers_from_config(&DeterminismConfig::default()).unwrap();
        assert!(time.is_ambient());
        assert!(ids.is_ambient());
    }
}
