//! Failure report endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::logging::log_request_operation;
use crate::models::{LotId, PlotId, RequestDraft, RequestKind, RequestReport};
use crate::web::auth::ActorId;
use crate::web::response_types::ApiResult;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WaterSupplyFailureBody {
    pub lot: Option<LotId>,
    pub plot: Option<PlotId>,
    pub observations: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationFailureBody {
    pub observations: String,
}

pub async fn create_water_supply_failure(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(body): Json<WaterSupplyFailureBody>,
) -> ApiResult<(StatusCode, Json<RequestReport>)> {
    // Validation decides whether the lot/plot combination is acceptable
    let draft = RequestDraft {
        kind: RequestKind::WaterSupplyFailure,
        lot: body.lot,
        plot: body.plot,
        observations: Some(body.observations),
    };
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

pub async fn create_application_failure(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(body): Json<ApplicationFailureBody>,
) -> ApiResult<(StatusCode, Json<RequestReport>)> {
    let draft = RequestDraft::application_failure(body.observations);
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
