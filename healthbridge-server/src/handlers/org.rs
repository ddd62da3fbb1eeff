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

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Ack, AppointmentRecord, AppointmentStatus, DoctorUpdateRequest, NewAppointmentRequest,
    NewDoctorRequest, NewUser, Role, StatusUpdateRequest, format_date_time, parse_date_time,
};
use crate::service::AppState;

#[derive(Debug, Deserialize)]
pub struct DoctorQuery {
    pub organization_id: i64,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationQuery {
    pub organization_id: i64,
}

pub async fn add_doctor(
    State(state): State<AppState>,
    payload: Result<Json<NewDoctorRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(request) = payload?;
    if state.store.organization(request.organization_id).is_none() {
        return Err(ApiError::not_found("Organization not found"));
    }
    if state.store.user_by_email(&request.email).is_some() {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let password_hash = state.hash_password(&request.password).await?;
    let doctor = state.store.create_user(NewUser {
        email: request.email.trim().to_string(),
        password_hash,
        full_name: Some(request.full_name),
        role: Role::Doctor,
        organization_id: Some(request.organization_id),
        specialization: request.specialization,
        availability: request.availability,
    })?;

    info!(doctor_id = doctor.id, organization_id = request.organization_id, "Doctor added");
    Ok(Json(Ack::with("Doctor added successfully")))
}

pub async fn list_doctors(
    State(state): State<AppState>,
    query: Result<Query<DoctorQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(query) = query?;
    let doctors = state
        .store
        .doctors_in(query.organization_id, query.search.as_deref())
        .into_iter()
        .map(|d| {
            json!({
                "id": d.id,
                "full_name": d.full_name,
                "email": d.email,
                "specialization": d.specialization,
                "availability": d.availability,
                "is_active": d.is_active,
            })
        })
        .collect();
    Ok(Json(doctors))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<DoctorUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(update) = payload?;
    state.store.update_doctor(id, update)?;
    Ok(Json(Ack::with("Doctor updated")))
}

pub async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Ack>> {
    state.store.delete_doctor(id)?;
    info!(doctor_id = id, "Doctor removed");
    Ok(Json(Ack::with("Doctor removed")))
}

pub async fn list_appointments(
    State(state): State<AppState>,
    query: Result<Query<OrganizationQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(query) = query?;
    let appointments = state
        .store
        .organization_appointments(query.organization_id)
        .into_iter()
        .map(|a| {
            let doctor = state.store.user(a.doctor_id);
            json!({
                "id": a.id,
                "doctor_name": doctor.as_ref().and_then(|d| d.full_name.clone()).unwrap_or_else(|| "Unknown".into()),
                "doctor_specialization": doctor.and_then(|d| d.specialization).unwrap_or_default(),
                "patient_name": a.patient_name,
                "date_time": format_date_time(&a.date_time),
                "reason": a.reason,
                "status": a.status,
            })
        })
        .collect();
    Ok(Json(appointments))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    payload: Result<Json<NewAppointmentRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(request) = payload?;
    let record = appointment_record(request, false)?;
    let created = state.store.create_appointment(record);
    info!(appointment_id = created.id, "Appointment scheduled");
    Ok(Json(Ack::with("Appointment scheduled")))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(update) = payload?;
    state
        .store
        .transition_appointment(id, update.status, |_| {})?;
    Ok(Json(Ack::ok()))
}

/// Validates the date; `keep_patient_id` is false for admin-created bookings.
pub(crate) fn appointment_record(
    request: NewAppointmentRequest,
    keep_patient_id: bool,
) -> ApiResult<AppointmentRecord> {
    let date_time = parse_date_time(&request.date_time)
        .ok_or_else(|| ApiError::bad_request("Invalid date format"))?;
    Ok(AppointmentRecord {
        id: 0,
        organization_id: request.organization_id,
        doctor_id: request.doctor_id,
        patient_id: request.patient_id.filter(|_| keep_patient_id),
        patient_name: request.patient_name,
        date_time,
        reason: request.reason,
        status: AppointmentStatus::Scheduled,
        diagnosis: None,
        treatment_notes: None,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, call};
    use axum::Router;
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    async fn organization(app: &Router) -> i64 {
        call(
            app,
            Method::POST,
            "/api/org/register",
            Some(json!({
                "org_name": "Mercy", "admin_email": "admin@mercy.org",
                "admin_password": "pw", "admin_name": "Ada"
            })),
        )
        .await;
        let (_, login) = call(
            app,
            Method::POST,
            "/api/login",
            Some(json!({"email": "admin@mercy.org", "password": "pw"})),
        )
        .await;
        login["organization_id"].as_i64().unwrap()
    }

    async fn add_doctor(app: &Router, org: i64, name: &str, specialization: &str) -> StatusCode {
        let email = format!("{}@mercy.org", name.to_lowercase().replace(' ', "."));
        let (status, _) = call(
            app,
            Method::POST,
            "/api/org/doctors",
            Some(json!({
                "email": email, "password": "pw", "full_name": name,
                "specialization": specialization, "organization_id": org
            })),
        )
        .await;
        status
    }

    #[tokio::test]
    async fn test_doctor_crud_with_search() {
        let (app, _) = app();
        let org = organization(&app).await;
        assert_eq!(add_doctor(&app, org, "Meredith Grey", "Surgery").await, StatusCode::OK);
        assert_eq!(add_doctor(&app, org, "Derek Shepherd", "Neurology").await, StatusCode::OK);

        let uri = format!("/api/org/doctors?organization_id={}&search=neuro", org);
        let (_, found) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        let id = found[0]["id"].as_i64().unwrap();

        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/api/org/doctors/{}", id),
            Some(json!({"availability": "Mon-Fri", "full_name": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let uri = format!("/api/org/doctors?organization_id={}&search=", org);
        let (_, all) = call(&app, Method::GET, &uri, None).await;
        let derek = all
            .as_array()
            .unwrap()
            .iter()
            .find(|d| d["id"] == id)
            .unwrap();
        assert_eq!(derek["full_name"], "Derek Shepherd");
        assert_eq!(derek["availability"], "Mon-Fri");

        let path = format!("/api/org/doctors/{}", id);
        let (status, _) = call(&app, Method::DELETE, &path, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&app, Method::DELETE, &path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Doctor not found");
    }

    #[tokio::test]
    async fn test_unknown_organization() {
        let (app, _) = app();
        assert_eq!(add_doctor(&app, 42, "Nobody", "None").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_appointments_newest_first_and_status_update() {
        let (app, _) = app();
        let org = organization(&app).await;
        add_doctor(&app, org, "Meredith Grey", "Surgery").await;
        let (_, doctors) = call(
            &app,
            Method::GET,
            &format!("/api/org/doctors?organization_id={}", org),
            None,
        )
        .await;
        let doctor_id = doctors[0]["id"].as_i64().unwrap();

        for when in ["2026-01-05T09:00:00", "2026-03-05T09:00:00Z"] {
            let (status, _) = call(
                &app,
                Method::POST,
                "/api/org/appointments",
                Some(json!({
                    "doctor_id": doctor_id, "organization_id": org,
                    "patient_name": "Ann", "date_time": when, "reason": "Checkup"
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, listing) = call(
            &app,
            Method::GET,
            &format!("/api/org/appointments?organization_id={}", org),
            None,
        )
        .await;
        let listing: &Vec<Value> = listing.as_array().unwrap();
        assert_eq!(listing[0]["date_time"], "2026-03-05T09:00:00");
        assert_eq!(listing[0]["doctor_name"], "Meredith Grey");
        assert_eq!(listing[0]["doctor_specialization"], "Surgery");
        assert_eq!(listing[0]["status"], "Scheduled");

        let path = format!("/api/org/appointments/{}", listing[0]["id"]);
        let (status, _) = call(&app, Method::PUT, &path, Some(json!({"status": "Cancelled"}))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) =
            call(&app, Method::PUT, &path, Some(json!({"status": "Completed"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Appointment is already Cancelled");

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/org/appointments/999",
            Some(json!({"status": "Cancelled"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Appointment not found");
    }

    #[tokio::test]
    async fn test_invalid_date() {
        let (app, _) = app();
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/org/appointments",
            Some(json!({
                "doctor_id": 1, "organization_id": 1, "patient_name": "Ann",
                "date_time": "tomorrow", "reason": "x"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid date format");
    }
}
