//! HTTP handlers, grouped per resource.

pub mod assignments;
pub mod health;
pub mod maintenance;
pub mod reports;
pub mod requests;
