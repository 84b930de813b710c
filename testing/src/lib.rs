//! # Uniform Requests Testing
//!
//! Deterministic test doubles for the uniform request lifecycle:
//!
//! - [`FixedClock`]: a settable, advanceable clock so escalation windows
//!   can be crossed without real delays
//! - [`test_catalog`]: a small garment catalog fixture
//! - [`FailingProfileStore`]: a profile store wrapper with injectable
//!   write failures, for reconciliation atomicity tests

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Mutex;
use uniform_requests_core::{
    Clock, EmployeeId, EmployeeProfileStore, GarmentKey, GarmentType, Size, StaticCatalog,
    StoreError,
};

/// Fixed clock for deterministic tests.
///
/// Returns the same time until explicitly moved with [`FixedClock::set`] or
/// [`FixedClock::advance`].
#[derive(Debug)]
pub struct FixedClock {
    time: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a fixed clock at the given time.
    #[must_use]
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time: Mutex::new(time),
        }
    }

    /// Set the current time.
    pub fn set(&self, time: DateTime<Utc>) {
        *self.lock() = time;
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut time = self.lock();
        *time += duration;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.time.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

/// Create a fixed clock at a well-known instant (2025-01-01 00:00:00 UTC).
///
/// # Panics
///
/// Panics if the hardcoded timestamp fails to parse, which should never
/// happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

/// A small catalog fixture: jacket (S/M/L/XL), trousers (S/M/L) and boots
/// (42/43/44).
#[must_use]
pub fn test_catalog() -> StaticCatalog {
    let sizes = |labels: &[&str]| labels.iter().map(|label| Size::new(*label)).collect();
    StaticCatalog::new(vec![
        GarmentType {
            key: GarmentKey::new("jacket"),
            display_name: "Work Jacket".to_string(),
            allowed_sizes: sizes(&["S", "M", "L", "XL"]),
        },
        GarmentType {
            key: GarmentKey::new("trousers"),
            display_name: "Work Trousers".to_string(),
            allowed_sizes: sizes(&["S", "M", "L"]),
        },
        GarmentType {
            key: GarmentKey::new("boots"),
            display_name: "Safety Boots".to_string(),
            allowed_sizes: sizes(&["42", "43", "44"]),
        },
    ])
}

/// Profile store wrapper that fails writes for chosen garment keys.
///
/// Delegates to the wrapped store; a key registered with
/// [`FailingProfileStore::fail_on_key`] makes `set_assigned_size` return
/// [`StoreError::Unavailable`] instead. Reads and rollback clears always
/// pass through, so atomicity tests can observe the rolled-back profile.
#[derive(Debug)]
pub struct FailingProfileStore<P> {
    inner: P,
    fail_on: Mutex<HashSet<GarmentKey>>,
}

impl<P> FailingProfileStore<P> {
    /// Wrap a profile store.
    #[must_use]
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            fail_on: Mutex::new(HashSet::new()),
        }
    }

    /// Make every `set_assigned_size` for this key fail.
    pub fn fail_on_key(&self, key: GarmentKey) {
        self.failing().insert(key);
    }

    /// Stop failing writes for this key.
    pub fn heal_key(&self, key: &GarmentKey) {
        self.failing().remove(key);
    }

    /// A reference to the wrapped store.
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    fn failing(&self) -> std::sync::MutexGuard<'_, HashSet<GarmentKey>> {
        match self.fail_on.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait::async_trait]
impl<P> EmployeeProfileStore for FailingProfileStore<P>
where
    P: EmployeeProfileStore,
{
    async fn assigned_sizes(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<std::collections::HashMap<GarmentKey, Size>, StoreError> {
        self.inner.assigned_sizes(employee_id).await
    }

    async fn set_assigned_size(
        &self,
        employee_id: &EmployeeId,
        key: &GarmentKey,
        size: &Size,
    ) -> Result<(), StoreError> {
        if self.failing().contains(key) {
            return Err(StoreError::Unavailable(format!(
                "injected profile write failure for '{key}'"
            )));
        }
        self.inner.set_assigned_size(employee_id, key, size).await
    }

    async fn clear_assigned_size(
        &self,
        employee_id: &EmployeeId,
        key: &GarmentKey,
    ) -> Result<(), StoreError> {
        self.inner.clear_assigned_size(employee_id, key).await
    }
}

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use uniform_requests_core::GarmentCatalog;

    #[test]
    fn fixed_clock_holds_still_until_advanced() {
        let clock = test_clock();
        let start = clock.now();
        assert_eq!(clock.now(), start);

        clock.advance(Duration::days(3));
        assert_eq!(clock.now(), start + Duration::days(3));
    }

    #[test]
    fn catalog_fixture_tracks_its_keys() {
        let catalog = test_catalog();
        assert!(catalog.is_tracked(&GarmentKey::new("jacket")));
        assert!(!catalog.is_tracked(&GarmentKey::new("cape")));
    }
}
