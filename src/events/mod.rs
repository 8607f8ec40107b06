//! # Lifecycle Event System
//!
//! Every state transition of the engine raises exactly one lifecycle event,
//! synchronously, before the triggering operation returns success. Delivery
//! (mail, push, whatever the district wires up) is the dispatcher's concern;
//! the engine only guarantees the trigger contract.

pub mod publisher;

pub use publisher::{
    DispatchError, EventPublisher, LifecycleEvent, LifecycleEventKind, NotificationDispatcher,
};
