//! Store adapter contracts consumed by the lifecycle.
//!
//! The core is storage-agnostic: it talks to a durable request store and an
//! employee profile store through these traits. No storage engine is
//! mandated; `uniform-requests-memory` ships in-memory implementations.
//!
//! Status writes go through a conditional compare-status-then-update so a
//! transition that raced with another actor fails with
//! [`StoreError::StatusConflict`] instead of silently losing an update.

use crate::error::StoreError;
use crate::types::{EmployeeId, GarmentKey, GarmentRequest, RequestId, RequestStatus, Size};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Partial update to a stored request.
///
/// `None` fields are left unchanged. `dispute_reason` is doubly optional so
/// a patch can distinguish "leave as is" (`None`) from "clear"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPatch {
    /// New status.
    pub status: Option<RequestStatus>,
    /// Approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Shipping timestamp.
    pub shipped_at: Option<DateTime<Utc>>,
    /// Confirmation timestamp.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Rejection timestamp.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Dispute reason to set or clear.
    pub dispute_reason: Option<Option<String>>,
}

impl RequestPatch {
    /// A patch that only moves the status.
    #[must_use]
    pub fn status(status: RequestStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Apply this patch to a request record in place.
    pub fn apply(&self, request: &mut GarmentRequest) {
        if let Some(status) = self.status {
            request.status = status;
        }
        if let Some(at) = self.approved_at {
            request.approved_at = Some(at);
        }
        if let Some(at) = self.shipped_at {
            request.shipped_at = Some(at);
        }
        if let Some(at) = self.confirmed_at {
            request.confirmed_at = Some(at);
        }
        if let Some(at) = self.rejected_at {
            request.rejected_at = Some(at);
        }
        if let Some(reason) = &self.dispute_reason {
            request.dispute_reason.clone_from(reason);
        }
    }
}

/// Durable CRUD store for request records.
///
/// One record per request, primary-keyed by ID, with secondary lookups by
/// employee and by status. Records are never deleted; terminal requests are
/// retained for history.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Persist a newly submitted request.
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyExists`] if the ID is taken.
    async fn create(&self, request: GarmentRequest) -> Result<(), StoreError>;

    /// Fetch a request by ID.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no record exists under the ID.
    async fn get(&self, id: &RequestId) -> Result<GarmentRequest, StoreError>;

    /// All requests of an employee, ordered by submission time.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot serve the query.
    async fn list_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<GarmentRequest>, StoreError>;

    /// All requests currently in the given status, ordered by submission
    /// time. Drives per-status dashboard counters.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot serve the query.
    async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<GarmentRequest>, StoreError>;

    /// Conditionally patch a request: the patch is applied only if the
    /// stored status equals `expected`. Returns the updated record.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the ID is unknown,
    /// [`StoreError::StatusConflict`] if the stored status moved.
    async fn update(
        &self,
        id: &RequestId,
        expected: RequestStatus,
        patch: RequestPatch,
    ) -> Result<GarmentRequest, StoreError>;
}

/// Durable store mapping each employee to their currently assigned size per
/// garment key.
///
/// Each `(employee, garment key)` pair is a single shared slot, overwritten
/// by the most recent successful confirmation - never merged, never
/// appended. Mutated only as a side effect of `confirm_receipt`.
#[async_trait]
pub trait EmployeeProfileStore: Send + Sync {
    /// The employee's currently assigned size per garment key.
    ///
    /// An employee with no profile yet yields an empty map.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the store cannot serve the query.
    async fn assigned_sizes(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<HashMap<GarmentKey, Size>, StoreError>;

    /// Overwrite the assigned size for one garment key.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the write could not be applied.
    async fn set_assigned_size(
        &self,
        employee_id: &EmployeeId,
        key: &GarmentKey,
        size: &Size,
    ) -> Result<(), StoreError>;

    /// Remove the assigned size for one garment key, if present.
    ///
    /// Used by the lifecycle to roll back a partially applied
    /// reconciliation.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] if the write could not be applied.
    async fn clear_assigned_size(
        &self,
        employee_id: &EmployeeId,
        key: &GarmentKey,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, NewRequest, RequestReason, RequestedItem};
    use smallvec::smallvec;

    fn request() -> GarmentRequest {
        GarmentRequest::new(
            RequestId::new(),
            NewRequest {
                employee_id: EmployeeId::new("E1"),
                employee_name: "Jo Field".to_string(),
                location: Location::new("north"),
                reason: RequestReason::Purchase,
                items: smallvec![RequestedItem {
                    garment_key: GarmentKey::new("jacket"),
                    display_name: "Work Jacket".to_string(),
                    size: Size::new("L"),
                    quantity: 1,
                }],
                notes: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn status_patch_only_touches_status() {
        let mut request = request();
        let before = request.clone();
        RequestPatch::status(RequestStatus::Approved).apply(&mut request);
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.items, before.items);
        assert_eq!(request.approved_at, before.approved_at);
    }

    #[test]
    fn patch_can_clear_dispute_reason() {
        let mut request = request();
        request.status = RequestStatus::Disputed;
        request.dispute_reason = Some("wrong size".to_string());

        let patch = RequestPatch {
            status: Some(RequestStatus::Shipped),
            dispute_reason: Some(None),
            ..RequestPatch::default()
        };
        patch.apply(&mut request);

        assert_eq!(request.status, RequestStatus::Shipped);
        assert!(request.dispute_reason.is_none());
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut request = request();
        let before = request.clone();
        RequestPatch::default().apply(&mut request);
        assert_eq!(request, before);
    }
}
