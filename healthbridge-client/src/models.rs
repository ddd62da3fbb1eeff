//! Wire types for both services. The services own every invariant; these
//! structs only describe the shapes observed at the boundary, so most fields
//! are lenient (`default`, `Option`) to survive partial payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl HealthStatus {
    /// Reported in place of an error when a service cannot be reached.
    pub fn degraded() -> Self {
        Self {
            status: "error".to_string(),
            details: Map::new(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    OrgAdmin,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::OrgAdmin => "org_admin",
            Role::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgRegistration {
    pub org_name: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_name: String,
    pub user_id: i64,
    pub role: Role,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub organization_id: Option<i64>,
}

/// The signed-in user as held by the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub organization: Option<Organization>,
}

impl User {
    pub fn from_login(email: impl Into<String>, login: LoginResponse) -> Self {
        let organization = login.organization_id.map(|organization_id| Organization {
            organization_id,
            organization_name: login.organization_name.unwrap_or_default(),
        });
        Self {
            user_id: login.user_id,
            user_name: login.user_name,
            email: email.into(),
            role: login.role,
            organization,
        }
    }

    pub fn organization_id(&self) -> Option<i64> {
        self.organization.as_ref().map(|o| o.organization_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub organization_id: i64,
    pub organization_name: String,
}

/// Generic `{ status, message }` acknowledgement returned by mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Medications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationCreated {
    pub status: String,
    pub data: Medication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdherenceStatus {
    Taken,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceLog {
    pub medication_id: String,
    pub status: AdherenceStatus,
    pub timestamp: DateTime<Utc>,
}

impl AdherenceLog {
    pub fn now(medication_id: impl Into<String>, status: AdherenceStatus) -> Self {
        Self {
            medication_id: medication_id.into(),
            status,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Doctors & appointments
// ---------------------------------------------------------------------------

/// A doctor as listed either by an organization or by the public directory;
/// each listing fills a different subset of the optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Doctor {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDoctor {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    pub organization_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }

    /// Scheduled may move to Completed or Cancelled; both are final.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (
                AppointmentStatus::Scheduled,
                AppointmentStatus::Completed | AppointmentStatus::Cancelled
            )
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default, alias = "doctor_specialization")]
    pub specialization: Option<String>,
    pub date_time: String,
    pub reason: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub treatment_notes: Option<String>,
}

impl Appointment {
    /// Only scheduled appointments offer a cancel action.
    pub fn can_cancel(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }

    pub fn can_complete(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor_id: i64,
    pub organization_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    pub patient_name: String,
    /// ISO 8601; the service rejects anything else.
    pub date_time: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentStatusUpdate {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationOutcome {
    pub diagnosis: String,
    pub treatment_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientHistoryEntry {
    pub date: String,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub treatment_notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Clinical AI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalNote {
    pub patient_id: String,
    pub note_text: String,
    #[serde(default)]
    pub note_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub clinical_summary: String,
    #[serde(default)]
    pub extracted_entities: ExtractedEntities,
    #[serde(default)]
    pub clinical_validations: Option<Value>,
    #[serde(default)]
    pub adherence_insights: Option<AdherenceInsights>,
    #[serde(default)]
    pub fhir_resources: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default)]
    pub conditions: Vec<ExtractedCondition>,
    #[serde(default)]
    pub medications: Vec<ExtractedMedication>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedCondition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub clinical_text: String,
    #[serde(default)]
    pub icd_10: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMedication {
    #[serde(default, deserialize_with = "null_as_default")]
    pub drug_name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdherenceInsights {
    /// Model-written; a number, a numeric string, or absent.
    #[serde(default, deserialize_with = "lenient_score")]
    pub complexity_score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub barriers_identified: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingRequest {
    pub age: u32,
    pub medications: Vec<ExtractedMedication>,
    pub barriers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoachingResponse {
    #[serde(default)]
    pub coaching_messages: Vec<CoachingMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub medication: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub importance: Option<String>,
    #[serde(default)]
    pub timing: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionScan {
    #[serde(default)]
    pub medications: Vec<PrescribedMedication>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedMedication {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionQuery {
    pub medications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub interactions: Vec<Interaction>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub drug_a: String,
    pub drug_b: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub mechanism: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

impl Interaction {
    pub fn severity_level(&self) -> Severity {
        Severity::parse(self.severity.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Moderate,
    Low,
    Other,
}

impl Severity {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Severity::High,
            "moderate" => Severity::Moderate,
            "low" => Severity::Low,
            _ => Severity::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeIdentified {
    pub de_identified_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: String,
    pub action: String,
    pub user: String,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub upload_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockRequest {
    pub user_id: i64,
    pub password: String,
}

/// Short-lived permission to fetch one document, issued after a password check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentGrant {
    pub document_id: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl DocumentGrant {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_role_does_not_fail_decoding() {
        let login: LoginResponse = serde_json::from_value(json!({
            "access_token": "t",
            "token_type": "bearer",
            "user_name": "sam",
            "user_id": 3,
            "role": "superuser"
        }))
        .unwrap();
        assert_eq!(login.role, Role::Unknown);
        assert_eq!(login.organization_id, None);
    }

    #[test]
    fn test_user_from_login_keeps_organization() {
        let login = LoginResponse {
            access_token: "t".into(),
            token_type: "bearer".into(),
            user_name: "Admin".into(),
            user_id: 1,
            role: Role::OrgAdmin,
            organization_name: Some("Mercy".into()),
            organization_id: Some(9),
        };
        let user = User::from_login("admin@mercy.org", login);
        assert_eq!(user.organization_id(), Some(9));
        assert_eq!(user.email, "admin@mercy.org");
    }

    #[test]
    fn test_appointment_transitions() {
        use AppointmentStatus::*;
        assert!(Scheduled.can_transition_to(Completed));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Scheduled));
        assert!(!Scheduled.can_transition_to(Scheduled));
        assert!(Completed.is_terminal() && Cancelled.is_terminal());
    }

    #[test]
    fn test_org_listing_specialization_alias() {
        let appt: Appointment = serde_json::from_value(json!({
            "id": 4,
            "doctor_name": "Dr. Who",
            "doctor_specialization": "Cardiology",
            "patient_name": "Ann",
            "date_time": "2026-03-01T09:00:00",
            "reason": "Checkup",
            "status": "Scheduled"
        }))
        .unwrap();
        assert_eq!(appt.specialization.as_deref(), Some("Cardiology"));
        assert!(appt.can_cancel());
    }

    #[test]
    fn test_interaction_report_tolerates_nulls() {
        let report: InteractionReport =
            serde_json::from_value(json!({ "interactions": null })).unwrap();
        assert!(report.interactions.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_severity_is_case_insensitive() {
        assert_eq!(Severity::parse("HIGH"), Severity::High);
        assert_eq!(Severity::parse(" Moderate "), Severity::Moderate);
        assert_eq!(Severity::parse("low"), Severity::Low);
        assert_eq!(Severity::parse("contraindicated"), Severity::Other);
    }

    #[test]
    fn test_adherence_log_wire_format() {
        let log = AdherenceLog::now("med-1", AdherenceStatus::Skipped);
        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["status"], "skipped");
        assert_eq!(value["medication_id"], "med-1");
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_analysis_tolerates_loose_ai_fields() {
        let analysis: ClinicalAnalysis = serde_json::from_value(json!({
            "clinical_summary": null,
            "extracted_entities": {
                "conditions": [{"clinical_text": null, "icd_10": "I10"}],
                "medications": [{"drug_name": "Metformin", "dosage": null}]
            },
            "adherence_insights": {"complexity_score": 2.5, "barriers_identified": null}
        }))
        .unwrap();

        assert_eq!(analysis.clinical_summary, "");
        assert_eq!(analysis.extracted_entities.conditions[0].clinical_text, "");
        assert_eq!(analysis.extracted_entities.medications[0].drug_name, "Metformin");
        let insights = analysis.adherence_insights.unwrap();
        assert_eq!(insights.complexity_score, Some(2.5));
        assert!(insights.barriers_identified.is_empty());
    }

    #[test]
    fn test_complexity_score_accepts_strings() {
        let parse = |score: serde_json::Value| {
            serde_json::from_value::<AdherenceInsights>(json!({"complexity_score": score}))
                .unwrap()
                .complexity_score
        };
        assert_eq!(parse(json!("3")), Some(3.0));
        assert_eq!(parse(json!(4)), Some(4.0));
        assert_eq!(parse(json!("high")), None);
        assert_eq!(parse(json!(null)), None);
    }

    #[test]
    fn test_coaching_message_without_text() {
        let response: CoachingResponse = serde_json::from_value(json!({
            "coaching_messages": [{"medication": "Lisinopril", "message": null}]
        }))
        .unwrap();
        assert_eq!(response.coaching_messages[0].medication, "Lisinopril");
        assert_eq!(response.coaching_messages[0].message, "");
    }
}
