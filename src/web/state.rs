//! # Web API Application State
//!
//! Shared state handed to every handler: the three engine components over
//! one store, plus the loaded configuration.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::engine::{AssignmentCoordinator, MaintenanceResolutionEngine, RequestReportStore};
use crate::events::NotificationDispatcher;
use crate::resources::{Authz, ResourceLookup};
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub requests: Arc<RequestReportStore>,
    pub assignments: Arc<AssignmentCoordinator>,
    pub maintenance: Arc<MaintenanceResolutionEngine>,
    pub config: Arc<EngineConfig>,
}

impl AppState {
    /// Wire the engine components over a shared store and the externally
    /// provided collaborator implementations.
    pub fn new(
        resources: Arc<dyn ResourceLookup>,
        authz: Arc<dyn Authz>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: EngineConfig,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let requests = Arc::new(RequestReportStore::new(
            store.clone(),
            resources,
            dispatcher.clone(),
        ));
        let assignments = Arc::new(AssignmentCoordinator::new(
            store.clone(),
            authz,
            dispatcher.clone(),
        ));
        let maintenance = Arc::new(MaintenanceResolutionEngine::new(
            store,
            requests.clone(),
            dispatcher,
        ));
        Self {
            requests,
            assignments,
            maintenance,
            config: Arc::new(config),
        }
    }
}
