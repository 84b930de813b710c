//! In-memory employee garment profile store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uniform_requests_core::{EmployeeId, EmployeeProfileStore, GarmentKey, Size, StoreError};

/// Profile store backed by a `RwLock<HashMap>`.
///
/// One size slot per `(employee, garment key)` pair, overwritten by the
/// most recent write.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<EmployeeId, HashMap<GarmentKey, Size>>>,
}

impl InMemoryProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeProfileStore for InMemoryProfileStore {
    async fn assigned_sizes(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<HashMap<GarmentKey, Size>, StoreError> {
        Ok(self
            .profiles
            .read()
            .await
            .get(employee_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_assigned_size(
        &self,
        employee_id: &EmployeeId,
        key: &GarmentKey,
        size: &Size,
    ) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().await;
        tracing::debug!(employee = %employee_id, garment = %key, size = %size, "assigned size updated");
        profiles
            .entry(employee_id.clone())
            .or_default()
            .insert(key.clone(), size.clone());
        Ok(())
    }

    async fn clear_assigned_size(
        &self,
        employee_id: &EmployeeId,
        key: &GarmentKey,
    ) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().await;
        if let Some(sizes) = profiles.get_mut(employee_id) {
            sizes.remove(key);
        }
        Ok(())
    }
}
