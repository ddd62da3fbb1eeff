//! Request bodies, stored records and response shapes of the reference backend.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    OrgAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        self == AppointmentStatus::Scheduled && next != AppointmentStatus::Scheduled
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

// Stored records

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub organization_id: Option<i64>,
    pub specialization: Option<String>,
    pub availability: Option<String>,
    pub is_active: bool,
}

impl UserRecord {
    /// Full name, or the local part of the email when none was given.
    pub fn display_name(&self) -> String {
        match self.full_name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub organization_id: Option<i64>,
    pub specialization: Option<String>,
    pub availability: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrganizationRecord {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AppointmentRecord {
    pub id: i64,
    pub organization_id: i64,
    pub doctor_id: i64,
    pub patient_id: Option<i64>,
    pub patient_name: String,
    pub date_time: NaiveDateTime,
    pub reason: String,
    pub status: AppointmentStatus,
    pub diagnosis: Option<String>,
    pub treatment_notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: String,
    pub user_id: i64,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: String,
    pub action: String,
    pub user: String,
    pub status: String,
}

// Requests

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrgRegisterRequest {
    pub org_name: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewDoctorRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    pub organization_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorUpdateRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewAppointmentRequest {
    pub doctor_id: i64,
    pub organization_id: i64,
    #[serde(default)]
    pub patient_id: Option<i64>,
    pub patient_name: String,
    pub date_time: String,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub diagnosis: String,
    pub treatment_notes: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub full_name: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewMedicationRequest {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Deserialize)]
pub struct ClinicalNoteRequest {
    pub patient_id: String,
    pub note_text: String,
    #[serde(default)]
    pub note_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub medications: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub user_id: i64,
    pub password: String,
}

// Responses

#[derive(Debug, Serialize)]
pub struct Ack {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            status: "success",
            message: None,
        }
    }

    pub fn with(message: &'static str) -> Self {
        Self {
            status: "success",
            message: Some(message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_name: String,
    pub user_id: i64,
    pub role: Role,
    pub organization_name: Option<String>,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    pub upload_date: String,
}

impl From<&DocumentRecord> for DocumentSummary {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            id: doc.id.clone(),
            filename: doc.filename.clone(),
            upload_date: doc.uploaded_at.to_rfc3339(),
        }
    }
}

/// Accepts RFC 3339 (converted to UTC), naive date-times with or without
/// seconds, and bare dates.
pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Some(aware.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn format_date_time(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}
