//! Flow request endpoints: creation, administrative decisions, detail view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::logging::log_request_operation;
use crate::models::{CancelType, LotId, RequestDraft, RequestReport};
use crate::state_machine::RequestEvent;
use crate::web::auth::ActorId;
use crate::web::response_types::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FlowChangeBody {
    pub lot: LotId,
    pub requested_flow: f64,
}

#[derive(Debug, Deserialize)]
pub struct FlowActivationBody {
    pub lot: LotId,
    pub requested_flow: f64,
}

#[derive(Debug, Deserialize)]
pub struct FlowCancelBody {
    pub lot: LotId,
    pub cancel_type: CancelType,
    pub observations: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectBody {
    pub observations: Option<String>,
}

pub async fn create_flow_change(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(body): Json<FlowChangeBody>,
) -> ApiResult<(StatusCode, Json<RequestReport>)> {
    let draft = RequestDraft::flow_change(body.lot, body.requested_flow);
    let record = state.requests.create(draft, &actor).await?;
    log_request_operation(
        "create",
        Some(&record.id),
        Some(record.kind.name()),
        "pending",
        None,
    );
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn create_flow_activation(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(body): Json<FlowActivationBody>,
) -> ApiResult<(StatusCode, Json<RequestReport>)> {
    let draft = RequestDraft::flow_activation(body.lot, body.requested_flow);
    let record = state.requests.create(draft, &actor).await?;
    log_request_operation(
        "create",
        Some(&record.id),
        Some(record.kind.name()),
        "pending",
        None,
    );
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn create_flow_cancel(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(body): Json<FlowCancelBody>,
) -> ApiResult<(StatusCode, Json<RequestReport>)> {
    let draft = RequestDraft::flow_cancel(body.lot, body.cancel_type, body.observations);
    let record = state.requests.create(draft, &actor).await?;
    log_request_operation(
        "create",
        Some(&record.id),
        Some(record.kind.name()),
        "pending",
        None,
    );
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_request(
    State(state): State<AppState>,
    ActorId(_actor): ActorId,
    Path(id): Path<String>,
) -> ApiResult<Json<RequestReport>> {
    state
        .requests
        .get(&id)
        .map(Json)
        .ok_or(ApiError::NotFound {
            message: format!("Request or report {id} not found"),
        })
}

pub async fn approve(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<String>,
) -> ApiResult<Json<RequestReport>> {
    let record = state
        .requests
        .transition_status(&id, RequestEvent::Approve, &actor)
        .await?;
    log_request_operation("approve", Some(&record.id), None, "finalized", None);
    Ok(Json(record))
}

// Observations are optional, so a bare POST without a body is accepted.
pub async fn reject(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(id): Path<String>,
    body: Option<Json<RejectBody>>,
) -> ApiResult<Json<RequestReport>> {
    let observations = body.and_then(|Json(body)| body.observations);
    let record = state
        .requests
        .transition_status(&id, RequestEvent::Reject(observations), &actor)
        .await?;
    log_request_operation("reject", Some(&record.id), None, "finalized", None);
    Ok(Json(record))
}
