//! In-memory store adapters for the uniform request lifecycle.
//!
//! This crate implements the `RequestStore` and `EmployeeProfileStore`
//! adapter traits from `uniform-requests-core` on top of tokio `RwLock`
//! maps. The request store honors the conditional
//! compare-status-then-update contract, so the lifecycle's concurrency
//! guarantees hold here exactly as they would against a durable engine.
//!
//! Intended for tests, demos and single-process deployments; nothing
//! survives a restart.

pub mod profiles;
pub mod requests;

pub use profiles::InMemoryProfileStore;
pub use requests::InMemoryRequestStore;
