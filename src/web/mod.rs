//! # HTTP Surface
//!
//! axum router over the shared [`AppState`]. Status codes are contractual:
//! 201 on creation, 400 with a stable error code for broken invariants,
//! 401 for missing identity, 403 for missing capabilities, 404 for unknown
//! ids. The `X-User-Id` header carries the caller identity resolved by the
//! upstream authentication layer.

pub mod auth;
pub mod handlers;
pub mod response_types;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use auth::ActorId;
pub use response_types::{ApiError, ApiResult};
pub use state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/requests/flow-change",
            post(handlers::requests::create_flow_change),
        )
        .route(
            "/requests/flow-activation",
            post(handlers::requests::create_flow_activation),
        )
        .route(
            "/requests/flow-cancel",
            post(handlers::requests::create_flow_cancel),
        )
        .route("/requests/{id}", get(handlers::requests::get_request))
        .route("/requests/{id}/approve", post(handlers::requests::approve))
        .route("/requests/{id}/reject", post(handlers::requests::reject))
        .route(
            "/reports/water-supply-failure",
            post(handlers::reports::create_water_supply_failure),
        )
        .route(
            "/reports/application-failure",
            post(handlers::reports::create_application_failure),
        )
        .route(
            "/assignments",
            post(handlers::assignments::create_assignment),
        )
        .route(
            "/maintenance-reports",
            post(handlers::maintenance::create_maintenance_report),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
