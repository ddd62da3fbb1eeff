use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::error::ApiResult;
use crate::models::{Ack, AuditEntry, Medication, NewMedicationRequest};
use crate::service::AppState;

pub async fn list_medications(State(state): State<AppState>) -> Json<Vec<Medication>> {
    Json(state.store.medications().await)
}

pub async fn add_medication(
    State(state): State<AppState>,
    payload: Result<Json<NewMedicationRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let medication = state
        .store
        .add_medication(request.name, request.dosage, request.frequency)
        .await;
    info!(medication_id = %medication.id, "Medication added");
    Ok(Json(json!({ "status": "success", "data": medication })))
}

pub async fn delete_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ack>> {
    state.store.remove_medication(&id).await?;
    Ok(Json(Ack::ok()))
}

/// Free-form adherence record; also lands in the audit log.
pub async fn log_adherence(
    State(state): State<AppState>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(entry) = payload?;
    state.store.log_adherence(entry).await;
    Ok(Json(Ack::ok()))
}

pub async fn audit_log(State(state): State<AppState>) -> Json<Vec<AuditEntry>> {
    Json(state.store.audit_log().await)
}
