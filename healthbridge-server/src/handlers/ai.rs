//! Clinical AI endpoints in demo mode. Every call is audited.

use axum::{
    Json,
    extract::{Multipart, State, rejection::JsonRejection},
};
use serde_json::{Value, json};
use tracing::info;

use crate::demo;
use crate::error::{ApiError, ApiResult};
use crate::models::{ClinicalNoteRequest, InteractionRequest};
use crate::service::AppState;

const CLIENT: &str = "Web Client";

pub async fn analyze_note(
    State(state): State<AppState>,
    payload: Result<Json<ClinicalNoteRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(note) = payload?;
    state
        .store
        .audit("Clinical Note Analysis", CLIENT, "Success")
        .await;
    info!(patient_id = %note.patient_id, chars = note.note_text.len(), "Analyzing clinical note");
    Ok(Json(demo::note_analysis()))
}

/// Expects the image in the multipart field `file`.
pub async fn scan_prescription(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut received = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            received = Some((content_type, bytes.len()));
        }
    }
    let (content_type, size) =
        received.ok_or_else(|| ApiError::unprocessable("Field 'file' is required"))?;

    state
        .store
        .audit("Prescription OCR Scan", CLIENT, "Success")
        .await;
    info!(?content_type, size, "Scanning prescription");
    Ok(Json(demo::prescription_scan()))
}

pub async fn check_interactions(
    State(state): State<AppState>,
    payload: Result<Json<InteractionRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    state
        .store
        .audit("Drug Interaction Check", CLIENT, "Success")
        .await;
    info!(medications = ?request.medications, "Checking interactions");
    Ok(Json(demo::interactions()))
}

pub async fn de_identify(
    State(state): State<AppState>,
    payload: Result<Json<ClinicalNoteRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(note) = payload?;
    state.store.audit("De-identification", CLIENT, "Success").await;
    Ok(Json(json!({
        "de_identified_text": demo::de_identify(&note.note_text)
    })))
}

/// Accepts any JSON object as context; the demo answer does not depend on it.
pub async fn generate_coaching(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(_context) = payload?;
    state
        .store
        .audit("Adherence Coaching", CLIENT, "Success")
        .await;
    Ok(Json(demo::coaching()))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, call};
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_analysis_and_de_identify_are_audited() {
        let (app, state) = app();
        let note = json!({"patient_id": "P-1", "note_text": "Pt presents with HTN. Continue lisinopril 10mg daily and metformin."});

        let (status, analysis) = call(&app, Method::POST, "/api/analyze-note", Some(note.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(analysis["extracted_entities"]["medications"][0]["drug_name"], "Lisinopril");

        let (_, masked) = call(&app, Method::POST, "/api/de-identify", Some(note)).await;
        assert_eq!(
            masked["de_identified_text"],
            "[DE-IDENTIFIED] Pt presents with HTN. Continue lisinopril 10mg dai..."
        );

        let audit = state.store.audit_log().await;
        assert_eq!(audit[0].action, "De-identification");
        assert_eq!(audit[1].action, "Clinical Note Analysis");
    }

    #[tokio::test]
    async fn test_scan_requires_file_field() {
        let (app, _) = app();
        let boundary = "XBOUNDARY";
        let with_file = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"rx.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
            b = boundary
        );
        let without_file = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
            b = boundary
        );

        for (body, expected) in [
            (with_file, StatusCode::OK),
            (without_file, StatusCode::UNPROCESSABLE_ENTITY),
        ] {
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/scan-prescription")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), expected);
            if expected == StatusCode::OK {
                let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
                let scan: Value = serde_json::from_slice(&bytes).unwrap();
                assert_eq!(scan["medications"][0]["name"], "Amoxicillin");
            }
        }
    }

    #[tokio::test]
    async fn test_interactions_and_coaching_payloads() {
        let (app, _) = app();
        let (_, report) = call(
            &app,
            Method::POST,
            "/api/check-interactions",
            Some(json!({"medications": ["Aspirin", "Warfarin"]})),
        )
        .await;
        assert_eq!(report["interactions"][0]["severity"], "High");

        let (_, coaching) = call(
            &app,
            Method::POST,
            "/api/generate-coaching",
            Some(json!({"age": 45, "medications": [], "barriers": []})),
        )
        .await;
        assert_eq!(coaching["coaching_messages"][1]["timing"], "With Dinner");
    }
}
