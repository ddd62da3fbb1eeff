use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ApiResult;
use crate::models::{Ack, AppointmentStatus, CompleteRequest, format_date_time};
use crate::service::AppState;

#[derive(Debug, Deserialize)]
pub struct DoctorQuery {
    pub doctor_id: i64,
}

/// The doctor's schedule, oldest first.
pub async fn appointments(
    State(state): State<AppState>,
    query: Result<Query<DoctorQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(query) = query?;
    let list = state
        .store
        .doctor_appointments(query.doctor_id)
        .into_iter()
        .map(|a| {
            json!({
                "id": a.id,
                "patient_name": a.patient_name,
                "date_time": format_date_time(&a.date_time),
                "reason": a.reason,
                "status": a.status,
                "diagnosis": a.diagnosis,
                "treatment_notes": a.treatment_notes,
            })
        })
        .collect();
    Ok(Json(list))
}

pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<CompleteRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(outcome) = payload?;
    state
        .store
        .transition_appointment(id, AppointmentStatus::Completed, |a| {
            a.diagnosis = Some(outcome.diagnosis);
            a.treatment_notes = Some(outcome.treatment_notes);
        })?;
    info!(appointment_id = id, "Consultation completed");
    Ok(Json(Ack::with("Consultation completed")))
}

pub async fn history(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<Value>>> {
    let entries = state
        .store
        .patient_history(&name)
        .into_iter()
        .map(|a| {
            let doctor_name = state
                .store
                .user(a.doctor_id)
                .and_then(|d| d.full_name)
                .unwrap_or_else(|| "Unknown".to_string());
            json!({
                "date": format_date_time(&a.date_time),
                "doctor_name": doctor_name,
                "diagnosis": a.diagnosis,
                "treatment_notes": a.treatment_notes,
            })
        })
        .collect();
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, call};
    use crate::models::{AppointmentRecord, AppointmentStatus, parse_date_time};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn booking(patient: &str, when: &str) -> AppointmentRecord {
        AppointmentRecord {
            id: 0,
            organization_id: 1,
            doctor_id: 7,
            patient_id: None,
            patient_name: patient.to_string(),
            date_time: parse_date_time(when).unwrap(),
            reason: "Follow-up".to_string(),
            status: AppointmentStatus::Scheduled,
            diagnosis: None,
            treatment_notes: None,
        }
    }

    #[tokio::test]
    async fn test_complete_then_history_by_encoded_name() {
        let (app, state) = app();
        let appt = state.store.create_appointment(booking("Ann Marie Lee", "2026-04-01T09:00:00"));
        state.store.create_appointment(booking("Bob", "2026-03-01T09:00:00"));

        let (_, schedule) = call(&app, Method::GET, "/api/doctor/appointments?doctor_id=7", None).await;
        assert_eq!(schedule[0]["patient_name"], "Bob");

        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/api/doctor/appointments/{}/complete", appt.id),
            Some(json!({"diagnosis": "Flu", "treatment_notes": "Rest"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, history) =
            call(&app, Method::GET, "/api/doctor/patients/marie%20lee/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history[0]["diagnosis"], "Flu");
        assert_eq!(history[0]["doctor_name"], "Unknown");
        assert_eq!(history[0]["date"], "2026-04-01T09:00:00");
    }

    #[tokio::test]
    async fn test_complete_unknown_appointment() {
        let (app, _) = app();
        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/doctor/appointments/5/complete",
            Some(json!({"diagnosis": "x", "treatment_notes": "y"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Appointment not found");
    }
}
