#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Riego Core
//!
//! Request/report lifecycle engine for an irrigation district: creation,
//! validation, assignment and resolution of flow-change requests and failure
//! reports on plots and lots.
//!
//! ## Overview
//!
//! Farmers file flow requests (change or cancel the water delivered to a lot)
//! and failure reports (water supply faults, application faults). District
//! staff delegate them to handlers, handlers resolve them through maintenance
//! reports, and approved flow decisions are written through to the valve
//! devices. Every status change appends to an audit trail and raises a
//! lifecycle event for the notification layer.
//!
//! ## Module Organization
//!
//! - [`models`] - Persisted entities: requests/reports, assignments,
//!   maintenance reports, status transitions
//! - [`state_machine`] - Lifecycle states, events, transition planning, and
//!   the error taxonomy
//! - [`validation`] - Pure, ordered invariant checks run before any mutation
//! - [`store`] - In-memory storage with serializable creation and
//!   compare-and-set transitions
//! - [`engine`] - The operational components: request store, assignment
//!   coordinator, maintenance resolution
//! - [`events`] - Lifecycle events and the notification dispatcher seam
//! - [`resources`] - Traits onto the external land registry, valve devices
//!   and permission storage
//! - [`web`] - axum HTTP surface with contractual status codes
//! - [`config`] - Layered engine configuration
//! - [`logging`] - Structured console + JSON file logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use riego_core::config::EngineConfig;
//! use riego_core::events::EventPublisher;
//! use riego_core::resources::InMemoryResources;
//! use riego_core::web::{router, AppState};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! riego_core::logging::init_structured_logging();
//!
//! let resources = Arc::new(InMemoryResources::new());
//! let state = AppState::new(
//!     resources.clone(),
//!     resources,
//!     Arc::new(EventPublisher::default()),
//!     EngineConfig::load()?,
//! );
//! let app = router(state);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod resources;
pub mod state_machine;
pub mod store;
pub mod validation;
pub mod web;

pub use error::{Result, RiegoError};
