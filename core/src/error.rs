//! Error types for the request lifecycle.
//!
//! Every failure is surfaced to the immediate caller with a distinguishable
//! kind; the lifecycle performs no silent retries and no best-effort
//! degradation, and never leaves a request in a partially committed state.

use crate::types::{GarmentKey, RequestId, RequestStatus, Size};
use thiserror::Error;

/// A submission was malformed and no request was created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The item list was empty.
    #[error("a request must contain at least one item")]
    EmptyItems,

    /// An item carried a zero quantity.
    #[error("item '{garment_key}' has zero quantity")]
    ZeroQuantity {
        /// The offending item's garment key.
        garment_key: GarmentKey,
    },

    /// An item referenced a garment type the catalog does not know.
    #[error("unknown garment type '{garment_key}'")]
    UnknownGarment {
        /// The unrecognized key.
        garment_key: GarmentKey,
    },

    /// An item's size is not allowed for its garment type.
    #[error("size '{size}' is not allowed for garment type '{garment_key}'")]
    SizeNotAllowed {
        /// The item's garment key.
        garment_key: GarmentKey,
        /// The rejected size.
        size: Size,
    },
}

/// Errors surfaced by store adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No request exists under the given ID.
    #[error("request {0} not found")]
    NotFound(RequestId),

    /// A request with the given ID already exists.
    #[error("request {0} already exists")]
    AlreadyExists(RequestId),

    /// A conditional update found a status other than the expected one.
    ///
    /// Callers rely on this to distinguish "already done" from
    /// "succeeded" when concurrent actors race on the same request.
    #[error("request {id} is {actual}, expected {expected}")]
    StatusConflict {
        /// The request whose status moved.
        id: RequestId,
        /// The status the writer expected to find.
        expected: RequestStatus,
        /// The status actually stored.
        actual: RequestStatus,
    },

    /// The underlying store could not serve the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by lifecycle operations.
///
/// On any error the stored request is left exactly as it was before the
/// operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The submission was malformed; nothing was created.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation attempted a transition illegal from the request's
    /// current status.
    #[error("cannot {attempted} request {id} while it is {from}")]
    InvalidTransition {
        /// The request the transition was attempted on.
        id: RequestId,
        /// The status the request was in.
        from: RequestStatus,
        /// The operation that was attempted.
        attempted: &'static str,
    },

    /// The referenced request does not exist.
    #[error("request {0} not found")]
    NotFound(RequestId),

    /// During `confirm_receipt` a profile write could not be applied.
    ///
    /// Already-applied profile writes were rolled back and the status
    /// change was not committed; request and profile remain consistent.
    #[error("reconciliation failed for request {id}: {reason}")]
    Reconciliation {
        /// The request being confirmed.
        id: RequestId,
        /// The status the request keeps.
        status: RequestStatus,
        /// Why the profile write failed.
        reason: String,
    },

    /// A store adapter failed for a reason other than a missing request.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}
