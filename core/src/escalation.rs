//! Age-based escalation of shipped requests.
//!
//! A shipped request that has gone unacknowledged for the escalation window
//! moves to `awaitingConfirmation` automatically. No background timer
//! exists: the check is a pure, idempotent function of `(request, now)`,
//! applied by every read path before a caller can observe the status.

use crate::types::{GarmentRequest, RequestStatus};
use chrono::{DateTime, Duration, Utc};

/// Days a shipment may sit unacknowledged before it escalates.
pub const ESCALATION_WINDOW_DAYS: i64 = 3;

/// The escalation window as a duration.
#[must_use]
pub fn escalation_window() -> Duration {
    Duration::days(ESCALATION_WINDOW_DAYS)
}

/// Whether a request is due to move from `shipped` to
/// `awaitingConfirmation`.
///
/// Idempotent: a request that already escalated (or is in any other
/// status) is simply not due; applying the check twice is a no-op, never an
/// error. `shipped_at` is never touched by escalation.
#[must_use]
pub fn due_for_escalation(request: &GarmentRequest, now: DateTime<Utc>) -> bool {
    request.status == RequestStatus::Shipped
        && request
            .shipped_at
            .is_some_and(|shipped_at| now - shipped_at >= escalation_window())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        EmployeeId, GarmentKey, Location, NewRequest, RequestId, RequestReason, RequestedItem,
        Size,
    };
    use smallvec::smallvec;

    fn shipped_request(shipped_at: DateTime<Utc>) -> GarmentRequest {
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
            shipped_at - Duration::hours(1),
        );
        request.status = RequestStatus::Shipped;
        request.approved_at = Some(shipped_at - Duration::minutes(30));
        request.shipped_at = Some(shipped_at);
        request
    }

    #[test]
    fn not_due_before_the_window() {
        let shipped_at = Utc::now();
        let request = shipped_request(shipped_at);
        assert!(!due_for_escalation(
            &request,
            shipped_at + Duration::days(3) - Duration::seconds(1)
        ));
    }

    #[test]
    fn due_exactly_at_the_window() {
        let shipped_at = Utc::now();
        let request = shipped_request(shipped_at);
        assert!(due_for_escalation(&request, shipped_at + Duration::days(3)));
        assert!(due_for_escalation(&request, shipped_at + Duration::days(4)));
    }

    #[test]
    fn already_escalated_request_is_not_due() {
        let shipped_at = Utc::now();
        let mut request = shipped_request(shipped_at);
        request.status = RequestStatus::AwaitingConfirmation;
        assert!(!due_for_escalation(
            &request,
            shipped_at + Duration::days(10)
        ));
    }

    #[test]
    fn only_shipped_requests_escalate() {
        let shipped_at = Utc::now();
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Confirmed,
            RequestStatus::Disputed,
            RequestStatus::Rejected,
        ] {
            let mut request = shipped_request(shipped_at);
            request.status = status;
            assert!(
                !due_for_escalation(&request, shipped_at + Duration::days(10)),
                "{status} must not escalate"
            );
        }
    }
}
