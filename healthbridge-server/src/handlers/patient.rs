use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use rand::Rng;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Ack, AppointmentStatus, NewAppointmentRequest, ProfileUpdateRequest, format_date_time,
};
use crate::service::AppState;

use super::org::appointment_record;

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    #[serde(default)]
    pub specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatientQuery {
    pub patient_id: i64,
}

/// Public doctor directory. Ratings are display-only and drawn per request.
pub async fn directory(
    State(state): State<AppState>,
    query: Result<Query<DirectoryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(query) = query?;
    let doctors = state.store.directory(query.specialization.as_deref());
    let listing = doctors
        .into_iter()
        .map(|d| {
            let organization_name = d
                .organization_id
                .and_then(|id| state.store.organization(id))
                .map(|o| o.name)
                .unwrap_or_else(|| "Unknown".to_string());
            json!({
                "id": d.id,
                "full_name": d.full_name,
                "specialization": d.specialization,
                "availability": d.availability,
                "organization_id": d.organization_id,
                "organization_name": organization_name,
                "rating": random_rating(),
            })
        })
        .collect();
    Ok(Json(listing))
}

fn random_rating() -> f64 {
    let raw: f64 = rand::rng().random_range(3.5..=5.0);
    (raw * 10.0).round() / 10.0
}

pub async fn appointments(
    State(state): State<AppState>,
    query: Result<Query<PatientQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(query) = query?;
    let list = state
        .store
        .patient_appointments(query.patient_id)
        .into_iter()
        .map(|a| {
            let doctor = state.store.user(a.doctor_id);
            json!({
                "id": a.id,
                "doctor_name": doctor.as_ref().and_then(|d| d.full_name.clone()).unwrap_or_else(|| "Unknown".into()),
                "specialization": doctor.and_then(|d| d.specialization).unwrap_or_default(),
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

pub async fn book(
    State(state): State<AppState>,
    payload: Result<Json<NewAppointmentRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(request) = payload?;
    let record = appointment_record(request, true)?;
    let booked = state.store.create_appointment(record);
    info!(appointment_id = booked.id, patient_id = ?booked.patient_id, "Appointment booked");
    Ok(Json(Ack::with("Appointment booked")))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Ack>> {
    state
        .store
        .transition_appointment(id, AppointmentStatus::Cancelled, |_| {})?;
    Ok(Json(Ack::with("Appointment cancelled")))
}

pub async fn update_profile(
    State(state): State<AppState>,
    query: Result<Query<PatientQuery>, QueryRejection>,
    payload: Result<Json<ProfileUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Query(query) = query?;
    let Json(update) = payload?;
    if state.store.user(query.patient_id).is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let password_hash = match update.password.filter(|p| !p.is_empty()) {
        Some(password) => Some(state.hash_password(&password).await?),
        None => None,
    };
    state
        .store
        .update_profile(query.patient_id, update.full_name, password_hash)?;
    Ok(Json(Ack::with("Profile updated")))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, call};
    use crate::models::{NewUser, Role};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_book_then_cancel_once() {
        let (app, _) = app();
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/patient/appointments",
            Some(json!({
                "doctor_id": 3, "organization_id": 1, "patient_id": 11,
                "patient_name": "Ann", "date_time": "2026-11-02T10:00:00", "reason": "Pain"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, mine) = call(&app, Method::GET, "/api/patient/appointments?patient_id=11", None).await;
        assert_eq!(mine[0]["status"], "Scheduled");
        assert_eq!(mine[0]["doctor_name"], "Unknown");
        let cancel = format!("/api/patient/appointments/{}/cancel", mine[0]["id"]);

        let (status, _) = call(&app, Method::PUT, &cancel, None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, mine) = call(&app, Method::GET, "/api/patient/appointments?patient_id=11", None).await;
        assert_eq!(mine[0]["status"], "Cancelled");

        let (status, _) = call(&app, Method::PUT, &cancel, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_directory_rating_range_and_filter() {
        let (app, state) = app();
        let (org, _) = state
            .store
            .create_organization(
                "Mercy",
                NewUser {
                    email: "admin@mercy.org".into(),
                    password_hash: "h".into(),
                    full_name: None,
                    role: Role::OrgAdmin,
                    organization_id: None,
                    specialization: None,
                    availability: None,
                },
            )
            .unwrap();
        state
            .store
            .create_user(NewUser {
                email: "grey@mercy.org".into(),
                password_hash: "h".into(),
                full_name: Some("Dr. Grey".into()),
                role: Role::Doctor,
                organization_id: Some(org.id),
                specialization: Some("Cardiology".into()),
                availability: None,
            })
            .unwrap();

        let (_, listing) = call(&app, Method::GET, "/api/doctors?specialization=cardio", None).await;
        let rating = listing[0]["rating"].as_f64().unwrap();
        assert!((3.5..=5.0).contains(&rating));
        assert_eq!(listing[0]["organization_name"], "Mercy");

        let (_, none) = call(&app, Method::GET, "/api/doctors?specialization=derm", None).await;
        assert!(none.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_profile_update_unknown_user() {
        let (app, _) = app();
        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/patient/profile?patient_id=404",
            Some(json!({"full_name": "X"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "User not found");
    }

    #[tokio::test]
    async fn test_profile_password_change_takes_effect() {
        let (app, _) = app();
        call(
            &app,
            Method::POST,
            "/api/register",
            Some(json!({"email": "ann@example.com", "password": "old"})),
        )
        .await;
        let (_, login) = call(
            &app,
            Method::POST,
            "/api/login",
            Some(json!({"email": "ann@example.com", "password": "old"})),
        )
        .await;
        assert_eq!(login["user_name"], "ann");

        let uri = format!("/api/patient/profile?patient_id={}", login["user_id"]);
        let (status, _) = call(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"full_name": "Ann Lee", "password": "new"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/login",
            Some(json!({"email": "ann@example.com", "password": "old"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, login) = call(
            &app,
            Method::POST,
            "/api/login",
            Some(json!({"email": "ann@example.com", "password": "new"})),
        )
        .await;
        assert_eq!(login["user_name"], "Ann Lee");
    }
}
