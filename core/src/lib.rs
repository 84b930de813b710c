//! # Uniform Requests Core
//!
//! Lifecycle state machine for employee uniform requests across several
//! physical locations: an employee asks for a garment, a coordinator
//! approves, rejects or ships it, and the employee later confirms receipt
//! or disputes it.
//!
//! # Architecture
//!
//! ```text
//!  employee / coordinator actions
//!              │
//!              ▼
//!      ┌───────────────────┐     transition events      ┌──────────────┐
//!      │  RequestLifecycle │ ─────────────────────────► │ presentation │
//!      │  (state machine)  │                            │    layer     │
//!      └────────┬──────────┘                            └──────────────┘
//!               │
//!       ┌───────┼──────────────────┐
//!       ▼       ▼                  ▼
//!  RequestStore EmployeeProfile  GarmentCatalog
//!   (adapter)    Store (adapter)  (static reference data)
//! ```
//!
//! The core holds the business rules and nothing else:
//!
//! - **Validation**: a submission needs a non-empty item list and a valid
//!   size for every garment key ([`catalog`]).
//! - **Transitions**: status only moves along the edges of the automaton in
//!   [`lifecycle`]; everything else fails with a distinguishable error.
//! - **Escalation**: a shipment unacknowledged for three days moves to
//!   `awaitingConfirmation` lazily on read, with no background timer
//!   ([`escalation`]).
//! - **Reconciliation**: confirming receipt overwrites the employee's
//!   assigned size per tracked garment key, atomically with the status
//!   change ([`lifecycle`]).
//!
//! Storage engines, stock levels, replenishment and rendering are external
//! collaborators behind the adapter traits in [`store`] and [`catalog`].

pub mod catalog;
pub mod environment;
pub mod error;
pub mod escalation;
pub mod events;
pub mod lifecycle;
pub mod store;
pub mod types;

pub use catalog::{GarmentCatalog, GarmentType, StaticCatalog};
pub use environment::{Clock, LifecycleEnvironment, SystemClock};
pub use error::{LifecycleError, StoreError, ValidationError};
pub use escalation::{due_for_escalation, escalation_window, ESCALATION_WINDOW_DAYS};
pub use events::{TransitionBus, TransitionEvent};
pub use lifecycle::RequestLifecycle;
pub use store::{EmployeeProfileStore, RequestPatch, RequestStore};
pub use types::{
    EmployeeId, GarmentKey, GarmentRequest, Location, NewRequest, RequestId, RequestItems,
    RequestReason, RequestStatus, RequestedItem, Size,
};
