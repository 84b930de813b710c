//! Property test: the lifecycle automaton is closed.
//!
//! For every (status, operation) pair, either the operation commits a
//! transition along a legal edge, or it fails with `InvalidTransition` and
//! the stored status is unchanged.

#![allow(clippy::unwrap_used, clippy::panic)]

mod support;

use chrono::Duration;
use proptest::prelude::*;
use support::{harness, jacket_request, Harness};
use uniform_requests_core::{
    Clock, GarmentRequest, LifecycleError, RequestId, RequestStatus, RequestStore, TransitionEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Approve,
    Reject,
    Ship,
    Confirm,
    Dispute,
    Reopen,
}

const OPS: [Op; 6] = [
    Op::Approve,
    Op::Reject,
    Op::Ship,
    Op::Confirm,
    Op::Dispute,
    Op::Reopen,
];

/// The legal edges of the automaton, independent of the implementation.
fn legal_target(status: RequestStatus, op: Op) -> Option<RequestStatus> {
    use RequestStatus::{
        Approved, AwaitingConfirmation, Confirmed, Disputed, Pending, Rejected, Shipped,
    };
    match (op, status) {
        (Op::Approve, Pending) => Some(Approved),
        (Op::Reject, Pending) => Some(Rejected),
        (Op::Ship, Approved) => Some(Shipped),
        (Op::Confirm, Shipped | AwaitingConfirmation) => Some(Confirmed),
        (Op::Dispute, Shipped | AwaitingConfirmation) => Some(Disputed),
        (Op::Reopen, Disputed) => Some(Shipped),
        _ => None,
    }
}

/// Seed the store with a request already in `status`, with timestamps that
/// keep a fresh shipment out of the escalation window so the lazy check
/// cannot move the status underneath the operation under test.
async fn seed(h: &Harness, status: RequestStatus) -> GarmentRequest {
    let now = h.clock.now();
    let mut request = GarmentRequest::new(RequestId::new(), jacket_request("E1"), now);
    request.status = status;
    if status != RequestStatus::Pending {
        request.approved_at = Some(now);
    }
    if matches!(
        request.status,
        RequestStatus::Shipped
            | RequestStatus::AwaitingConfirmation
            | RequestStatus::Confirmed
            | RequestStatus::Disputed
    ) {
        request.shipped_at = Some(now);
    }
    if status == RequestStatus::AwaitingConfirmation {
        request.shipped_at = Some(now - Duration::days(4));
    }
    if status == RequestStatus::Confirmed {
        request.confirmed_at = Some(now);
    }
    if status == RequestStatus::Rejected {
        request.rejected_at = Some(now);
        request.approved_at = None;
        request.shipped_at = None;
    }
    if status == RequestStatus::Disputed {
        request.dispute_reason = Some("wrong size".to_string());
    }
    h.requests.create(request.clone()).await.unwrap();
    request
}

async fn apply(h: &Harness, id: &RequestId, op: Op) -> Result<TransitionEvent, LifecycleError> {
    match op {
        Op::Approve => h.lifecycle.approve(id).await,
        Op::Reject => h.lifecycle.reject(id).await,
        Op::Ship => h.lifecycle.ship(id).await,
        Op::Confirm => h.lifecycle.confirm_receipt(id).await,
        Op::Dispute => h.lifecycle.dispute(id, "wrong size").await,
        Op::Reopen => h.lifecycle.reopen_shipment(id).await,
    }
}

proptest! {
    #[test]
    fn automaton_is_closed(
        status_index in 0..RequestStatus::ALL.len(),
        op_index in 0..OPS.len(),
    ) {
        let status = RequestStatus::ALL[status_index];
        let op = OPS[op_index];
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        runtime.block_on(async move {
            let h = harness();
            let request = seed(&h, status).await;

            match apply(&h, &request.id, op).await {
                Ok(event) => {
                    let target = legal_target(status, op)
                        .unwrap_or_else(|| panic!("{op:?} from {status} must not succeed"));
                    assert_eq!(event.from_status, Some(status));
                    assert_eq!(event.to_status, target);
                    let stored = h.requests.get(&request.id).await.unwrap();
                    assert_eq!(stored.status, target);
                }
                Err(err) => {
                    assert_eq!(
                        legal_target(status, op),
                        None,
                        "{op:?} from {status} failed unexpectedly: {err}"
                    );
                    assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
                    let stored = h.requests.get(&request.id).await.unwrap();
                    assert_eq!(stored.status, status, "failed {op:?} must not move the status");
                }
            }
        });
    }
}
