//! Core types for uniform request tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

/// Unique identifier for a garment request.
///
/// Generated when a request is submitted and used for every subsequent
/// lifecycle operation on that request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an employee, assigned by the HR system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Create an employee ID from its external representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier for a category of issued work clothing (e.g. a jacket
/// or trousers type).
///
/// Shared between a request's items and the employee's garment profile;
/// the profile is keyed by this type during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GarmentKey(String);

impl GarmentKey {
    /// Create a garment key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GarmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A garment size label ("S", "M", "L", "44", ...).
///
/// Sizes are opaque to the lifecycle; validity is decided by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Size(String);

impl Size {
    /// Create a size label.
    pub fn new(size: impl Into<String>) -> Self {
        Self(size.into())
    }

    /// Get the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical location an employee is based at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location(String);

impl Location {
    /// Create a location.
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Get the location as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a request was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestReason {
    /// Replacing a worn or damaged garment.
    Replacement,
    /// A new purchase (first issue, extra set).
    Purchase,
}

/// Status of a garment request.
///
/// Status only ever advances along the edges of the lifecycle automaton;
/// it is never written directly by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestStatus {
    /// Submitted, waiting for a coordinator decision.
    Pending,
    /// Approved by a coordinator, waiting to be shipped.
    Approved,
    /// Shipped to the employee's location.
    Shipped,
    /// Shipped more than the escalation window ago without a confirmation.
    AwaitingConfirmation,
    /// Receipt confirmed by the employee (terminal).
    Confirmed,
    /// Receipt disputed by the employee.
    Disputed,
    /// Rejected by a coordinator (terminal).
    Rejected,
}

impl RequestStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Approved,
        Self::Shipped,
        Self::AwaitingConfirmation,
        Self::Confirmed,
        Self::Disputed,
        Self::Rejected,
    ];

    /// Whether no further transition is legal from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected)
    }

    /// Wire name of this status (camelCase, matching the serde encoding).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Shipped => "shipped",
            Self::AwaitingConfirmation => "awaitingConfirmation",
            Self::Confirmed => "confirmed",
            Self::Disputed => "disputed",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a garment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedItem {
    /// Garment type being requested.
    pub garment_key: GarmentKey,
    /// Human-readable name, denormalized from the catalog at submission.
    pub display_name: String,
    /// Requested size.
    pub size: Size,
    /// Number of pieces; always positive.
    pub quantity: u32,
}

/// Item lines of a request.
///
/// Most requests carry 1-3 items, so `SmallVec[3]` avoids heap allocation.
pub type RequestItems = SmallVec<[RequestedItem; 3]>;

/// Submission payload for a new garment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    /// Employee raising the request.
    pub employee_id: EmployeeId,
    /// Employee display name, denormalized for lists.
    pub employee_name: String,
    /// Location the garments ship to.
    pub location: Location,
    /// Why the request was raised.
    pub reason: RequestReason,
    /// Requested items; must be non-empty.
    pub items: RequestItems,
    /// Free-form note for the coordinator.
    pub notes: Option<String>,
}

/// A garment request and its full lifecycle history.
///
/// Created exactly once by `submit`, mutated exclusively by lifecycle
/// operations, never deleted; terminal requests are retained for history.
/// Present timestamps are monotonically ordered:
/// `requested_at <= approved_at <= shipped_at <= confirmed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentRequest {
    /// Unique request ID.
    pub id: RequestId,
    /// Employee the request belongs to.
    pub employee_id: EmployeeId,
    /// Employee display name.
    pub employee_name: String,
    /// Shipping location.
    pub location: Location,
    /// Reason the request was raised.
    pub reason: RequestReason,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// Requested items; never empty.
    pub items: RequestItems,
    /// Free-form note for the coordinator.
    pub notes: Option<String>,
    /// When the request was submitted.
    pub requested_at: DateTime<Utc>,
    /// When a coordinator approved it.
    pub approved_at: Option<DateTime<Utc>>,
    /// When it was shipped. Reset if a disputed shipment is reopened.
    pub shipped_at: Option<DateTime<Utc>>,
    /// When the employee confirmed receipt.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When a coordinator rejected it.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Why the employee disputed the shipment, while disputed.
    pub dispute_reason: Option<String>,
}

impl GarmentRequest {
    /// Create a pending request from a validated submission.
    #[must_use]
    pub fn new(id: RequestId, submission: NewRequest, requested_at: DateTime<Utc>) -> Self {
        Self {
            id,
            employee_id: submission.employee_id,
            employee_name: submission.employee_name,
            location: submission.location,
            reason: submission.reason,
            status: RequestStatus::Pending,
            items: submission.items,
            notes: submission.notes,
            requested_at,
            approved_at: None,
            shipped_at: None,
            confirmed_at: None,
            rejected_at: None,
            dispute_reason: None,
        }
    }
}
