// Register handlers, shared by /api/trade-registers and /api/training-registers.
// The router attaches the RegisterKind as an Extension on each nested group.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::api::format::{alerts_to_api_values, registrations_to_api_values};
use crate::api::payload::{RecordDateBody, RegistrationPayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::RegistryError;
use crate::state::AppState;
use crate::types::RegisterKind;

/// Error mapper carrying the failed action, e.g. "Failed to add trade registration"
fn failure(state: &AppState, context: String) -> impl FnOnce(RegistryError) -> ApiError {
    let expose = state.expose_error_details();
    move |err| ApiError::from_registry(err, &context, expose)
}

/// GET /api/{kind}-registers - all registrations, newest first, as a bare array
pub async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<RegisterKind>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let rows = state
        .registrations
        .list(kind)
        .await
        .map_err(failure(&state, format!("Failed to fetch {kind} registrations")))?;

    Ok(Json(registrations_to_api_values(kind, &rows)))
}

/// POST /api/{kind}-registers - create, stamping Record_Date server-side
pub async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<RegisterKind>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let context = format!("Failed to add {kind} registration");
    let payload =
        RegistrationPayload::from_json(kind, body).map_err(failure(&state, context.clone()))?;

    let id = state
        .registrations
        .create(kind, payload.worker_id, payload.fields)
        .await
        .map_err(failure(&state, context))?;

    Ok(ApiResponse::created(json!({ "id": id }))
        .with_message(format!("{} added successfully", kind.label())))
}

/// PUT /api/{kind}-registers/:worker_id - full update matched on the Record_Date day
pub async fn update(
    State(state): State<AppState>,
    Extension(kind): Extension<RegisterKind>,
    Path(worker_id): Path<i32>,
    Json(body): Json<Value>,
) -> ApiResult<()> {
    let context = format!("Failed to update {kind} registration");
    let payload =
        RegistrationPayload::from_json(kind, body).map_err(failure(&state, context.clone()))?;

    state
        .registrations
        .update(kind, worker_id, payload.record_date.as_deref(), payload.fields)
        .await
        .map_err(failure(&state, context))?;

    Ok(ApiResponse::message(format!("{} updated successfully", kind.label())))
}

/// DELETE /api/{kind}-registers/:worker_id - body { Record_Date }, exact timestamp match
pub async fn delete(
    State(state): State<AppState>,
    Extension(kind): Extension<RegisterKind>,
    Path(worker_id): Path<i32>,
    body: Option<Json<Value>>,
) -> ApiResult<()> {
    let selector = RecordDateBody::from_json(body.map(|Json(v)| v));

    state
        .registrations
        .delete(kind, worker_id, selector.record_date.as_deref())
        .await
        .map_err(failure(&state, format!("Failed to delete {kind} registration")))?;

    Ok(ApiResponse::message(format!("{} deleted successfully", kind.label())))
}

/// GET /api/{kind}-registers/alerts - overdue and expiring-soon registrations, as a bare array
pub async fn alerts(
    State(state): State<AppState>,
    Extension(kind): Extension<RegisterKind>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let alerts = state
        .registrations
        .list_alerts(kind)
        .await
        .map_err(failure(&state, format!("Failed to fetch {kind} registration alerts")))?;

    Ok(Json(alerts_to_api_values(kind, &alerts)))
}

/// PUT /api/{kind}-registers/:worker_id/complete-alert
pub async fn complete_alert(
    state: State<AppState>,
    kind: Extension<RegisterKind>,
    worker_id: Path<i32>,
    body: Option<Json<Value>>,
) -> ApiResult<()> {
    acknowledge(state, kind, worker_id, body, true).await
}

/// PUT /api/{kind}-registers/:worker_id/incomplete-alert
pub async fn incomplete_alert(
    state: State<AppState>,
    kind: Extension<RegisterKind>,
    worker_id: Path<i32>,
    body: Option<Json<Value>>,
) -> ApiResult<()> {
    acknowledge(state, kind, worker_id, body, false).await
}

async fn acknowledge(
    State(state): State<AppState>,
    Extension(kind): Extension<RegisterKind>,
    Path(worker_id): Path<i32>,
    body: Option<Json<Value>>,
    value: bool,
) -> ApiResult<()> {
    let selector = RecordDateBody::from_json(body.map(|Json(v)| v));
    let outcome = if value { "complete" } else { "incomplete" };

    state
        .registrations
        .set_acknowledged(kind, worker_id, selector.record_date.as_deref(), value)
        .await
        .map_err(failure(
            &state,
            format!("Failed to mark {kind} registration alert as {outcome}"),
        ))?;

    Ok(ApiResponse::message(format!(
        "{} alert marked as {outcome}",
        kind.label()
    )))
}
