//! In-memory request store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uniform_requests_core::{
    EmployeeId, GarmentRequest, RequestId, RequestPatch, RequestStatus, RequestStore, StoreError,
};

/// Request store backed by a `RwLock<HashMap>`.
///
/// One record per request, keyed by ID. The conditional update takes the
/// write lock for the whole compare-and-patch, so a lost update can never
/// slip through between the status check and the write.
#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    records: RwLock<HashMap<RequestId, GarmentRequest>>,
}

impl InMemoryRequestStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored requests.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn by_submission_time(a: &GarmentRequest, b: &GarmentRequest) -> std::cmp::Ordering {
    a.requested_at
        .cmp(&b.requested_at)
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn create(&self, request: GarmentRequest) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&request.id) {
            return Err(StoreError::AlreadyExists(request.id));
        }
        tracing::debug!(request_id = %request.id, "request record created");
        records.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: &RequestId) -> Result<GarmentRequest, StoreError> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(*id))
    }

    async fn list_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<GarmentRequest>, StoreError> {
        let records = self.records.read().await;
        let mut matching: Vec<GarmentRequest> = records
            .values()
            .filter(|request| &request.employee_id == employee_id)
            .cloned()
            .collect();
        matching.sort_by(by_submission_time);
        Ok(matching)
    }

    async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<GarmentRequest>, StoreError> {
        let records = self.records.read().await;
        let mut matching: Vec<GarmentRequest> = records
            .values()
            .filter(|request| request.status == status)
            .cloned()
            .collect();
        matching.sort_by(by_submission_time);
        Ok(matching)
    }

    async fn update(
        &self,
        id: &RequestId,
        expected: RequestStatus,
        patch: RequestPatch,
    ) -> Result<GarmentRequest, StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        if record.status != expected {
            return Err(StoreError::StatusConflict {
                id: *id,
                expected,
                actual: record.status,
            });
        }
        patch.apply(record);
        Ok(record.clone())
    }
}
