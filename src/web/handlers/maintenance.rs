//! Maintenance report endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::logging::log_maintenance_operation;
use crate::models::{MaintenanceReport, MaintenanceSubmission};
use crate::web::auth::ActorId;
use crate::web::response_types::ApiResult;
use crate::web::state::AppState;

pub async fn create_maintenance_report(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(submission): Json<MaintenanceSubmission>,
) -> ApiResult<(StatusCode, Json<MaintenanceReport>)> {
    let report = state.maintenance.resolve(submission, &actor).await?;
    log_maintenance_operation(
        "resolve",
        Some(&report.id),
        Some(&report.assignment),
        &report.status.to_string(),
        None,
    );
    Ok((StatusCode::CREATED, Json(report)))
}
