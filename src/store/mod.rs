//! # Storage Layer
//!
//! Persistence for requests/reports, assignments and maintenance reports,
//! plus the append-only status transition audit trail.
//!
//! The layer carries the two concurrency guarantees of the engine:
//!
//! - the duplicate-pending check and the insert of a new request execute in
//!   one serializable critical section, so at most one concurrent creation
//!   succeeds per lot/plot;
//! - status updates are compare-and-set against the stored status, so of two
//!   concurrent finalizers exactly one wins and the other observes
//!   `AlreadyFinalized`.

pub mod memory;

pub use memory::InMemoryStore;
