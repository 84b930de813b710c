//! Injected dependencies for the lifecycle.
//!
//! Time is the only ambient dependency the core needs; it is abstracted
//! behind the [`Clock`] trait so age-based escalation is unit-testable
//! without real delays. Production uses [`SystemClock`], tests use a fixed
//! clock.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Clock trait - abstracts time operations for testability.
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Environment dependencies for the request lifecycle.
#[derive(Clone)]
pub struct LifecycleEnvironment {
    clock: Arc<dyn Clock>,
}

impl LifecycleEnvironment {
    /// Create an environment with the given clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// The injected clock.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl Default for LifecycleEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
