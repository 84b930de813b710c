//! Shared harness for lifecycle integration tests.

// Not every test file uses every helper.
#![allow(dead_code)]

use std::sync::Arc;
use uniform_requests_core::{
    EmployeeId, GarmentKey, LifecycleEnvironment, Location, NewRequest, RequestLifecycle,
    RequestReason, RequestedItem, Size, StaticCatalog,
};
use uniform_requests_memory::{InMemoryProfileStore, InMemoryRequestStore};
use uniform_requests_testing::{init_tracing, test_catalog, test_clock, FailingProfileStore};

/// A lifecycle wired to in-memory stores, a failable profile store and a
/// fixed clock.
pub struct Harness {
    pub clock: Arc<uniform_requests_testing::FixedClock>,
    pub requests: Arc<InMemoryRequestStore>,
    pub profiles: Arc<FailingProfileStore<InMemoryProfileStore>>,
    pub lifecycle: RequestLifecycle<
        InMemoryRequestStore,
        FailingProfileStore<InMemoryProfileStore>,
        StaticCatalog,
    >,
}

pub fn harness() -> Harness {
    init_tracing();
    let clock = Arc::new(test_clock());
    let requests = Arc::new(InMemoryRequestStore::new());
    let profiles = Arc::new(FailingProfileStore::new(InMemoryProfileStore::new()));
    let catalog = Arc::new(test_catalog());
    let env = LifecycleEnvironment::new(clock.clone());
    let lifecycle = RequestLifecycle::new(
        requests.clone(),
        profiles.clone(),
        catalog,
        env,
    );
    Harness {
        clock,
        requests,
        profiles,
        lifecycle,
    }
}

pub fn item(key: &str, name: &str, size: &str, quantity: u32) -> RequestedItem {
    RequestedItem {
        garment_key: GarmentKey::new(key),
        display_name: name.to_string(),
        size: Size::new(size),
        quantity,
    }
}

/// A single-jacket replacement request for the given employee.
pub fn jacket_request(employee: &str) -> NewRequest {
    NewRequest {
        employee_id: EmployeeId::new(employee),
        employee_name: "Jo Field".to_string(),
        location: Location::new("north"),
        reason: RequestReason::Replacement,
        items: [item("jacket", "Work Jacket", "L", 1)].into_iter().collect(),
        notes: None,
    }
}
