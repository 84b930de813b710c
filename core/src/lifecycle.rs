//! The request lifecycle state machine.
//!
//! [`RequestLifecycle`] validates submissions, applies every transition,
//! evaluates age-based escalation lazily on read paths, and reconciles the
//! employee garment profile on confirmation.
//!
//! ```text
//!             approve            ship
//!   pending ──────────► approved ─────► shipped ◄──────────────┐
//!      │                                  │  │                 │
//!      │ reject                 >= 3 days │  │ dispute         │ reopen
//!      ▼                                  ▼  │                 │
//!   rejected                 awaitingConfirmation ──► disputed ┘
//!                                         │  │          ▲
//!                          confirmReceipt │  └──────────┘
//!                                         ▼      dispute
//!                                     confirmed
//! ```
//!
//! Transitions on a single request are strictly ordered: an operation whose
//! precondition status has already been left behind fails with
//! [`LifecycleError::InvalidTransition`], never silently. Status writes are
//! conditional on the status the operation observed, so a racing actor
//! surfaces as a conflict instead of a lost update.

use crate::catalog::GarmentCatalog;
use crate::environment::LifecycleEnvironment;
use crate::error::{LifecycleError, StoreError, ValidationError};
use crate::escalation::due_for_escalation;
use crate::events::{TransitionBus, TransitionEvent};
use crate::store::{EmployeeProfileStore, RequestPatch, RequestStore};
use crate::types::{
    EmployeeId, GarmentKey, GarmentRequest, NewRequest, RequestId, RequestStatus, Size,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Coordinates the lifecycle of garment requests against a request store,
/// an employee profile store and the garment catalog.
///
/// Every state advance is triggered synchronously by a caller or by the
/// lazy escalation check performed inline during a read; no background
/// timers exist.
pub struct RequestLifecycle<R, P, C> {
    requests: Arc<R>,
    profiles: Arc<P>,
    catalog: Arc<C>,
    env: LifecycleEnvironment,
    bus: TransitionBus,
}

impl<R, P, C> RequestLifecycle<R, P, C>
where
    R: RequestStore,
    P: EmployeeProfileStore,
    C: GarmentCatalog,
{
    /// Create a lifecycle over the given stores and catalog.
    #[must_use]
    pub fn new(
        requests: Arc<R>,
        profiles: Arc<P>,
        catalog: Arc<C>,
        env: LifecycleEnvironment,
    ) -> Self {
        Self {
            requests,
            profiles,
            catalog,
            env,
            bus: TransitionBus::new(),
        }
    }

    /// Subscribe to transition events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.bus.subscribe()
    }

    // ========== Submission ==========

    /// Submit a new request. Returns the created record and its transition
    /// event.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Validation`] if the item list is empty, a quantity
    /// is zero, or a size is missing or invalid for its garment type; no
    /// record is created in that case.
    pub async fn submit(
        &self,
        submission: NewRequest,
    ) -> Result<(GarmentRequest, TransitionEvent), LifecycleError> {
        self.validate(&submission)?;

        let now = self.env.clock().now();
        let request = GarmentRequest::new(RequestId::new(), submission, now);
        self.requests.create(request.clone()).await?;

        let event = self.emit(request.id, None, RequestStatus::Pending, now);
        Ok((request, event))
    }

    fn validate(&self, submission: &NewRequest) -> Result<(), ValidationError> {
        if submission.items.is_empty() {
            return Err(ValidationError::EmptyItems);
        }
        for item in &submission.items {
            if item.quantity == 0 {
                return Err(ValidationError::ZeroQuantity {
                    garment_key: item.garment_key.clone(),
                });
            }
            let Some(allowed) = self.catalog.allowed_sizes(&item.garment_key) else {
                return Err(ValidationError::UnknownGarment {
                    garment_key: item.garment_key.clone(),
                });
            };
            if !allowed.contains(&item.size) {
                return Err(ValidationError::SizeNotAllowed {
                    garment_key: item.garment_key.clone(),
                    size: item.size.clone(),
                });
            }
        }
        Ok(())
    }

    // ========== Coordinator transitions ==========

    /// Approve a pending request.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] unless the request is pending.
    pub async fn approve(&self, id: &RequestId) -> Result<TransitionEvent, LifecycleError> {
        self.transition(id, &[RequestStatus::Pending], "approve", |now| RequestPatch {
            status: Some(RequestStatus::Approved),
            approved_at: Some(now),
            ..RequestPatch::default()
        })
        .await
    }

    /// Reject a pending request. Terminal.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] unless the request is pending.
    pub async fn reject(&self, id: &RequestId) -> Result<TransitionEvent, LifecycleError> {
        self.transition(id, &[RequestStatus::Pending], "reject", |now| RequestPatch {
            status: Some(RequestStatus::Rejected),
            rejected_at: Some(now),
            ..RequestPatch::default()
        })
        .await
    }

    /// Mark an approved request as shipped.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] unless the request is
    /// approved.
    pub async fn ship(&self, id: &RequestId) -> Result<TransitionEvent, LifecycleError> {
        self.transition(id, &[RequestStatus::Approved], "ship", |now| RequestPatch {
            status: Some(RequestStatus::Shipped),
            shipped_at: Some(now),
            ..RequestPatch::default()
        })
        .await
    }

    // ========== Employee transitions ==========

    /// Confirm receipt of a shipped (or escalated) request and reconcile
    /// the employee's garment profile.
    ///
    /// For every item whose garment key the catalog tracks, the employee's
    /// profile slot is overwritten with the item's size. Profile writes and
    /// the status commit are one logical unit: the profile is written
    /// first, the status second, and a failed profile write rolls back the
    /// slots already written so neither store moves.
    ///
    /// Confirming an already-confirmed request fails loudly; a silent no-op
    /// would risk a second, spurious profile overwrite.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] unless the request is shipped
    /// or awaiting confirmation; [`LifecycleError::Reconciliation`] if a
    /// profile write failed (the stored status is unchanged).
    pub async fn confirm_receipt(
        &self,
        id: &RequestId,
    ) -> Result<TransitionEvent, LifecycleError> {
        let request = self.load(id).await?;
        require_status(
            &request,
            &[RequestStatus::Shipped, RequestStatus::AwaitingConfirmation],
            "confirm",
        )?;

        let now = self.env.clock().now();
        let previous = self
            .profiles
            .assigned_sizes(&request.employee_id)
            .await
            .map_err(|err| self.reconciliation_failure(&request, &err))?;

        let mut written: Vec<GarmentKey> = Vec::new();
        for item in &request.items {
            if !self.catalog.is_tracked(&item.garment_key) {
                continue;
            }
            if let Err(err) = self
                .profiles
                .set_assigned_size(&request.employee_id, &item.garment_key, &item.size)
                .await
            {
                self.roll_back_profile(&request.employee_id, &written, &previous)
                    .await;
                return Err(self.reconciliation_failure(&request, &err));
            }
            written.push(item.garment_key.clone());
        }

        let patch = RequestPatch {
            status: Some(RequestStatus::Confirmed),
            confirmed_at: Some(now),
            ..RequestPatch::default()
        };
        match self.requests.update(id, request.status, patch).await {
            Ok(_) => Ok(self.emit(*id, Some(request.status), RequestStatus::Confirmed, now)),
            Err(err) => {
                // Status did not commit; undo the profile writes so the
                // two stores stay consistent.
                self.roll_back_profile(&request.employee_id, &written, &previous)
                    .await;
                Err(map_conflict(err, "confirm"))
            }
        }
    }

    /// Dispute a shipped (or escalated) request. The profile is untouched.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] unless the request is shipped
    /// or awaiting confirmation.
    pub async fn dispute(
        &self,
        id: &RequestId,
        reason: impl Into<String> + Send,
    ) -> Result<TransitionEvent, LifecycleError> {
        let reason = reason.into();
        self.transition(
            id,
            &[RequestStatus::Shipped, RequestStatus::AwaitingConfirmation],
            "dispute",
            move |_| RequestPatch {
                status: Some(RequestStatus::Disputed),
                dispute_reason: Some(Some(reason)),
                ..RequestPatch::default()
            },
        )
        .await
    }

    /// Move a disputed request back to shipped, clearing the dispute
    /// reason. Reopening resets the escalation window: `shipped_at` is set
    /// to now.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] unless the request is
    /// disputed.
    pub async fn reopen_shipment(
        &self,
        id: &RequestId,
    ) -> Result<TransitionEvent, LifecycleError> {
        self.transition(id, &[RequestStatus::Disputed], "reopen", |now| RequestPatch {
            status: Some(RequestStatus::Shipped),
            shipped_at: Some(now),
            dispute_reason: Some(None),
            ..RequestPatch::default()
        })
        .await
    }

    // ========== Reads (escalation applied first) ==========

    /// Fetch a request, applying any due escalation first.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::NotFound`] if the ID is unknown.
    pub async fn get(&self, id: &RequestId) -> Result<GarmentRequest, LifecycleError> {
        self.load(id).await
    }

    /// All requests of an employee, each with any due escalation applied
    /// before it is returned.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Store`] if the store cannot serve the query.
    pub async fn list_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<GarmentRequest>, LifecycleError> {
        let records = self.requests.list_by_employee(employee_id).await?;
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(self.apply_due_escalation(record).await?);
        }
        Ok(out)
    }

    /// All requests currently in the given status, with escalation applied
    /// before status is observed. Drives per-status dashboard counters.
    ///
    /// Asking for `shipped` excludes requests whose age already crossed the
    /// window; asking for `awaitingConfirmation` includes them.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Store`] if the store cannot serve the query.
    pub async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<GarmentRequest>, LifecycleError> {
        let mut records = self.requests.list_by_status(status).await?;
        if status == RequestStatus::AwaitingConfirmation {
            // Aged shipped requests belong in this list even though the
            // store still carries them as shipped.
            records.extend(self.requests.list_by_status(RequestStatus::Shipped).await?);
        }
        if !matches!(
            status,
            RequestStatus::Shipped | RequestStatus::AwaitingConfirmation
        ) {
            return Ok(records);
        }

        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.push(self.apply_due_escalation(record).await?);
        }
        out.retain(|request| request.status == status);
        out.sort_by(|a, b| {
            a.requested_at
                .cmp(&b.requested_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(out)
    }

    // ========== Internals ==========

    /// Load a request and apply any due escalation before anyone observes
    /// its status.
    async fn load(&self, id: &RequestId) -> Result<GarmentRequest, LifecycleError> {
        let request = self.requests.get(id).await?;
        self.apply_due_escalation(request).await
    }

    /// Persist the shipped -> awaitingConfirmation transition for a
    /// request whose age crossed the window. Idempotent; losing the
    /// conditional write to a concurrent escalation is not an error.
    async fn apply_due_escalation(
        &self,
        request: GarmentRequest,
    ) -> Result<GarmentRequest, LifecycleError> {
        let now = self.env.clock().now();
        if !due_for_escalation(&request, now) {
            return Ok(request);
        }

        let patch = RequestPatch::status(RequestStatus::AwaitingConfirmation);
        match self
            .requests
            .update(&request.id, RequestStatus::Shipped, patch)
            .await
        {
            Ok(updated) => {
                self.emit(
                    request.id,
                    Some(RequestStatus::Shipped),
                    RequestStatus::AwaitingConfirmation,
                    now,
                );
                Ok(updated)
            }
            // Another reader escalated (or an actor moved the request)
            // between our read and our write; theirs stands.
            Err(StoreError::StatusConflict { .. }) => Ok(self.requests.get(&request.id).await?),
            Err(err) => Err(err.into()),
        }
    }

    /// Common path for explicit transitions: load, check precondition,
    /// conditionally patch, emit.
    async fn transition(
        &self,
        id: &RequestId,
        allowed: &[RequestStatus],
        attempted: &'static str,
        build_patch: impl FnOnce(DateTime<Utc>) -> RequestPatch + Send,
    ) -> Result<TransitionEvent, LifecycleError> {
        let request = self.load(id).await?;
        require_status(&request, allowed, attempted)?;

        let now = self.env.clock().now();
        let patch = build_patch(now);
        let to_status = patch.status.unwrap_or(request.status);
        let updated = self
            .requests
            .update(id, request.status, patch)
            .await
            .map_err(|err| map_conflict(err, attempted))?;

        Ok(self.emit(updated.id, Some(request.status), to_status, now))
    }

    fn emit(
        &self,
        request_id: RequestId,
        from_status: Option<RequestStatus>,
        to_status: RequestStatus,
        timestamp: DateTime<Utc>,
    ) -> TransitionEvent {
        let event = TransitionEvent {
            request_id,
            from_status,
            to_status,
            timestamp,
        };
        tracing::info!(
            request_id = %request_id,
            from = from_status.map_or("none", RequestStatus::as_str),
            to = %to_status,
            "request transition committed"
        );
        self.bus.publish(event.clone());
        event
    }

    fn reconciliation_failure(
        &self,
        request: &GarmentRequest,
        err: &StoreError,
    ) -> LifecycleError {
        tracing::warn!(
            request_id = %request.id,
            employee = %request.employee_id,
            error = %err,
            "profile reconciliation failed; status not committed"
        );
        LifecycleError::Reconciliation {
            id: request.id,
            status: request.status,
            reason: err.to_string(),
        }
    }

    /// Restore the profile slots touched by a failed confirmation to their
    /// pre-call values. Best effort; individual rollback failures are
    /// logged and skipped.
    async fn roll_back_profile(
        &self,
        employee_id: &EmployeeId,
        written: &[GarmentKey],
        previous: &HashMap<GarmentKey, Size>,
    ) {
        for key in written {
            let result = match previous.get(key) {
                Some(size) => {
                    self.profiles
                        .set_assigned_size(employee_id, key, size)
                        .await
                }
                None => self.profiles.clear_assigned_size(employee_id, key).await,
            };
            if let Err(err) = result {
                tracing::warn!(
                    employee = %employee_id,
                    garment = %key,
                    error = %err,
                    "profile rollback write failed"
                );
            }
        }
    }
}

/// Reject the operation unless the request is in one of the allowed
/// statuses.
fn require_status(
    request: &GarmentRequest,
    allowed: &[RequestStatus],
    attempted: &'static str,
) -> Result<(), LifecycleError> {
    if allowed.contains(&request.status) {
        return Ok(());
    }
    tracing::warn!(
        request_id = %request.id,
        status = %request.status,
        attempted,
        "rejected illegal transition"
    );
    Err(LifecycleError::InvalidTransition {
        id: request.id,
        from: request.status,
        attempted,
    })
}

/// A lost conditional write means another actor moved the request between
/// our read and our write; surface it the same way a stale precondition is
/// surfaced.
fn map_conflict(err: StoreError, attempted: &'static str) -> LifecycleError {
    match err {
        StoreError::StatusConflict { id, actual, .. } => LifecycleError::InvalidTransition {
            id,
            from: actual,
            attempted,
        },
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, NewRequest, RequestReason, RequestedItem};
    use smallvec::smallvec;

    fn request_in(status: RequestStatus) -> GarmentRequest {
        let mut request = GarmentRequest::new(
            RequestId::new(),
            NewRequest {
                employee_id: EmployeeId::new("E1"),
                employee_name: "Jo Field".to_string(),
                location: Location::new("north"),
                reason: RequestReason::Replacement,
                items: smallvec![RequestedItem {
                    garment_key: GarmentKey::new("jacket"),
                    display_name: "Work Jacket".to_string(),
                    size: Size::new("L"),
                    quantity: 1,
                }],
                notes: None,
            },
            Utc::now(),
        );
        request.status = status;
        request
    }

    #[test]
    fn require_status_accepts_allowed_statuses() {
        let request = request_in(RequestStatus::Shipped);
        assert!(
            require_status(
                &request,
                &[RequestStatus::Shipped, RequestStatus::AwaitingConfirmation],
                "confirm",
            )
            .is_ok()
        );
    }

    #[test]
    fn require_status_rejects_with_observed_status() {
        let request = request_in(RequestStatus::Confirmed);
        let err = require_status(&request, &[RequestStatus::Shipped], "confirm");
        assert_eq!(
            err,
            Err(LifecycleError::InvalidTransition {
                id: request.id,
                from: RequestStatus::Confirmed,
                attempted: "confirm",
            })
        );
    }

    #[test]
    fn lost_conditional_write_surfaces_the_actual_status() {
        let id = RequestId::new();
        let err = map_conflict(
            StoreError::StatusConflict {
                id,
                expected: RequestStatus::Pending,
                actual: RequestStatus::Rejected,
            },
            "approve",
        );
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                id,
                from: RequestStatus::Rejected,
                attempted: "approve",
            }
        );
    }
}
