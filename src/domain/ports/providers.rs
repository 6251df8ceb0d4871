//! Time and id capabilities.
//!
//! The cognition core never reads the wall clock or draws random ids on its
//! own; callers inject these providers so runs can be replayed exactly.

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Whether this provider reads the ambient system clock.
    fn is_ambient(&self) -> bool {
        false
    }
}

/// Source of fresh identifiers.
pub trait IdProvider: Send + Sync {
    fn new_id(&self) -> String;

    /// Whether this provider draws ambient randomness.
    fn is_ambient(&self) -> bool {
        false
    }
}
