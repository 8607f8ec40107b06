//! Assignment endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::logging::log_assignment_operation;
use crate::models::{Assignment, AssignmentTarget, UserId};
use crate::web::auth::ActorId;
use crate::web::response_types::ApiResult;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssignmentBody {
    /// Externally tagged: `{"flow_request": "10123456"}` or
    /// `{"failure_report": "20123456"}`
    pub target: AssignmentTarget,
    pub assigned_to: UserId,
}

pub async fn create_assignment(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(body): Json<AssignmentBody>,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    let assignment = state
        .assignments
        .assign(body.target, &actor, &body.assigned_to)
        .await?;
    log_assignment_operation(
        "assign",
        Some(&assignment.id),
        Some(assignment.target.request_id()),
        Some(&assignment.assigned_to),
        "in_progress",
    );
    Ok((StatusCode::CREATED, Json(assignment)))
}
