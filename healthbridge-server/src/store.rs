//! In-memory tables. Each table is a concurrent map; ordered lists
//! (medications, audit log) sit behind an async `RwLock`.

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AppointmentRecord, AppointmentStatus, AuditEntry, DocumentRecord, DoctorUpdateRequest,
    Medication, NewUser, OrganizationRecord, Role, UserRecord,
};

pub struct Store {
    user_ids: AtomicI64,
    org_ids: AtomicI64,
    appointment_ids: AtomicI64,
    users: DashMap<i64, UserRecord>,
    emails: DashMap<String, i64>,
    organizations: DashMap<i64, OrganizationRecord>,
    org_names: DashMap<String, i64>,
    appointments: DashMap<i64, AppointmentRecord>,
    documents: DashMap<String, DocumentRecord>,
    medications: RwLock<Vec<Medication>>,
    adherence: RwLock<Vec<Map<String, Value>>>,
    audit: RwLock<VecDeque<AuditEntry>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Empty account tables with the demo medication list and audit trail.
    pub fn new() -> Self {
        Self {
            user_ids: AtomicI64::new(1),
            org_ids: AtomicI64::new(1),
            appointment_ids: AtomicI64::new(1),
            users: DashMap::new(),
            emails: DashMap::new(),
            organizations: DashMap::new(),
            org_names: DashMap::new(),
            appointments: DashMap::new(),
            documents: DashMap::new(),
            medications: RwLock::new(seed_medications()),
            adherence: RwLock::new(Vec::new()),
            audit: RwLock::new(seed_audit()),
        }
    }

    // Accounts

    pub fn create_user(&self, user: NewUser) -> ApiResult<UserRecord> {
        match self.emails.entry(email_key(&user.email)) {
            Entry::Occupied(_) => Err(ApiError::bad_request("Email already registered")),
            Entry::Vacant(slot) => {
                let record = self.insert_user(user);
                slot.insert(record.id);
                Ok(record)
            }
        }
    }

    /// Creates the organization and its admin together, or neither.
    pub fn create_organization(
        &self,
        name: &str,
        admin: NewUser,
    ) -> ApiResult<(OrganizationRecord, UserRecord)> {
        let org_slot = match self.org_names.entry(name.to_string()) {
            Entry::Occupied(_) => return Err(ApiError::bad_request("Organization already exists")),
            Entry::Vacant(slot) => slot,
        };
        let email_slot = match self.emails.entry(email_key(&admin.email)) {
            Entry::Occupied(_) => {
                return Err(ApiError::bad_request("Admin email already registered"));
            }
            Entry::Vacant(slot) => slot,
        };

        let organization = OrganizationRecord {
            id: self.org_ids.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
        };
        self.organizations
            .insert(organization.id, organization.clone());
        org_slot.insert(organization.id);

        let admin = self.insert_user(NewUser {
            organization_id: Some(organization.id),
            ..admin
        });
        email_slot.insert(admin.id);

        info!(organization_id = organization.id, "Organization registered");
        Ok((organization, admin))
    }

    fn insert_user(&self, user: NewUser) -> UserRecord {
        let record = UserRecord {
            id: self.user_ids.fetch_add(1, Ordering::SeqCst),
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            role: user.role,
            organization_id: user.organization_id,
            specialization: user.specialization,
            availability: user.availability,
            is_active: true,
        };
        self.users.insert(record.id, record.clone());
        record
    }

    pub fn user(&self, id: i64) -> Option<UserRecord> {
        self.users.get(&id).map(|u| u.clone())
    }

    pub fn user_by_email(&self, email: &str) -> Option<UserRecord> {
        let id = *self.emails.get(&email_key(email))?;
        self.user(id)
    }

    pub fn update_profile(
        &self,
        id: i64,
        full_name: String,
        password_hash: Option<String>,
    ) -> ApiResult<()> {
        let mut user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        user.full_name = Some(full_name);
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        Ok(())
    }

    pub fn organization(&self, id: i64) -> Option<OrganizationRecord> {
        self.organizations.get(&id).map(|o| o.clone())
    }

    // Doctors

    fn doctors(&self) -> Vec<UserRecord> {
        let mut doctors: Vec<UserRecord> = self
            .users
            .iter()
            .filter(|u| u.role == Role::Doctor)
            .map(|u| u.clone())
            .collect();
        doctors.sort_by_key(|d| d.id);
        doctors
    }

    /// Doctors of one organization whose name or specialization contains
    /// `search`, case-insensitively.
    pub fn doctors_in(&self, organization_id: i64, search: Option<&str>) -> Vec<UserRecord> {
        let needle = search.map(str::to_lowercase).filter(|s| !s.is_empty());
        self.doctors()
            .into_iter()
            .filter(|d| d.organization_id == Some(organization_id))
            .filter(|d| match &needle {
                None => true,
                Some(needle) => [&d.full_name, &d.specialization]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(needle)),
            })
            .collect()
    }

    pub fn directory(&self, specialization: Option<&str>) -> Vec<UserRecord> {
        let needle = specialization.map(str::to_lowercase).filter(|s| !s.is_empty());
        self.doctors()
            .into_iter()
            .filter(|d| match &needle {
                None => true,
                Some(needle) => d
                    .specialization
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(needle)),
            })
            .collect()
    }

    /// Blank fields in the update leave the stored value untouched.
    pub fn update_doctor(&self, id: i64, update: DoctorUpdateRequest) -> ApiResult<()> {
        let mut doctor = self
            .users
            .get_mut(&id)
            .filter(|d| d.role == Role::Doctor)
            .ok_or_else(|| ApiError::not_found("Doctor not found"))?;
        if let Some(name) = non_blank(update.full_name) {
            doctor.full_name = Some(name);
        }
        if let Some(specialization) = non_blank(update.specialization) {
            doctor.specialization = Some(specialization);
        }
        if let Some(availability) = non_blank(update.availability) {
            doctor.availability = Some(availability);
        }
        Ok(())
    }

    pub fn delete_doctor(&self, id: i64) -> ApiResult<()> {
        let (_, doctor) = self
            .users
            .remove_if(&id, |_, u| u.role == Role::Doctor)
            .ok_or_else(|| ApiError::not_found("Doctor not found"))?;
        self.emails.remove(&email_key(&doctor.email));
        Ok(())
    }

    // Appointments

    pub fn create_appointment(&self, mut appointment: AppointmentRecord) -> AppointmentRecord {
        appointment.id = self.appointment_ids.fetch_add(1, Ordering::SeqCst);
        appointment.status = AppointmentStatus::Scheduled;
        self.appointments
            .insert(appointment.id, appointment.clone());
        appointment
    }

    fn appointments_where<F>(&self, keep: F) -> Vec<AppointmentRecord>
    where
        F: Fn(&AppointmentRecord) -> bool,
    {
        self.appointments
            .iter()
            .filter(|a| keep(a.value()))
            .map(|a| a.clone())
            .collect()
    }

    pub fn organization_appointments(&self, organization_id: i64) -> Vec<AppointmentRecord> {
        let mut list = self.appointments_where(|a| a.organization_id == organization_id);
        list.sort_by(|a, b| b.date_time.cmp(&a.date_time));
        list
    }

    pub fn doctor_appointments(&self, doctor_id: i64) -> Vec<AppointmentRecord> {
        let mut list = self.appointments_where(|a| a.doctor_id == doctor_id);
        list.sort_by(|a, b| a.date_time.cmp(&b.date_time));
        list
    }

    pub fn patient_appointments(&self, patient_id: i64) -> Vec<AppointmentRecord> {
        let mut list = self.appointments_where(|a| a.patient_id == Some(patient_id));
        list.sort_by(|a, b| b.date_time.cmp(&a.date_time));
        list
    }

    /// Completed appointments whose patient name contains `name`, newest first.
    pub fn patient_history(&self, name: &str) -> Vec<AppointmentRecord> {
        let needle = name.to_lowercase();
        let mut list = self.appointments_where(|a| {
            a.status == AppointmentStatus::Completed
                && a.patient_name.to_lowercase().contains(&needle)
        });
        list.sort_by(|a, b| b.date_time.cmp(&a.date_time));
        list
    }

    /// Moves a scheduled appointment to a final status, applying `edit` to it.
    pub fn transition_appointment<F>(
        &self,
        id: i64,
        next: AppointmentStatus,
        edit: F,
    ) -> ApiResult<AppointmentRecord>
    where
        F: FnOnce(&mut AppointmentRecord),
    {
        let mut appointment = self
            .appointments
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("Appointment not found"))?;
        if !appointment.status.can_transition_to(next) {
            return Err(ApiError::bad_request(format!(
                "Appointment is already {}",
                appointment.status
            )));
        }
        appointment.status = next;
        edit(&mut appointment);
        Ok(appointment.clone())
    }

    // Medications, adherence, audit

    pub async fn medications(&self) -> Vec<Medication> {
        self.medications.read().await.clone()
    }

    pub async fn add_medication(&self, name: String, dosage: String, frequency: String) -> Medication {
        let medication = Medication {
            id: Uuid::new_v4().to_string(),
            name,
            dosage,
            frequency,
        };
        self.medications.write().await.push(medication.clone());
        medication
    }

    pub async fn remove_medication(&self, id: &str) -> ApiResult<()> {
        let mut medications = self.medications.write().await;
        let before = medications.len();
        medications.retain(|m| m.id != id);
        if medications.len() == before {
            return Err(ApiError::not_found("Medication not found"));
        }
        Ok(())
    }

    pub async fn log_adherence(&self, entry: Map<String, Value>) {
        let medication_id = entry
            .get("medication_id")
            .map(value_text)
            .unwrap_or_default();
        let status = entry
            .get("status")
            .map(value_text)
            .unwrap_or_else(|| "Logged".to_string());
        let timestamp = entry.get("timestamp").map(value_text);

        self.adherence.write().await.push(entry);
        self.audit_at(
            timestamp,
            &format!("Adherence Log: {}", medication_id),
            "System",
            &status,
        )
        .await;
    }

    pub async fn adherence_count(&self) -> usize {
        self.adherence.read().await.len()
    }

    pub async fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit.read().await.iter().cloned().collect()
    }

    /// Prepends an entry stamped with the current time.
    pub async fn audit(&self, action: &str, user: &str, status: &str) {
        self.audit_at(None, action, user, status).await;
    }

    async fn audit_at(&self, timestamp: Option<String>, action: &str, user: &str, status: &str) {
        let entry = AuditEntry {
            id: format!("{:08x}", rand::rng().random::<u32>()),
            timestamp: timestamp.unwrap_or_else(|| Utc::now().to_rfc3339()),
            action: action.to_string(),
            user: user.to_string(),
            status: status.to_string(),
        };
        self.audit.write().await.push_front(entry);
    }

    // Documents

    pub fn add_document(&self, document: DocumentRecord) {
        self.documents.insert(document.id.clone(), document);
    }

    pub fn documents_of(&self, user_id: i64) -> Vec<DocumentRecord> {
        let mut docs: Vec<DocumentRecord> = self
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .map(|d| d.clone())
            .collect();
        docs.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        docs
    }

    pub fn document(&self, id: &str) -> Option<DocumentRecord> {
        self.documents.get(id).map(|d| d.clone())
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn seed_medications() -> Vec<Medication> {
    [("1", "Metformin", "500mg"), ("2", "Lisinopril", "10mg")]
        .into_iter()
        .map(|(id, name, dosage)| Medication {
            id: id.to_string(),
            name: name.to_string(),
            dosage: dosage.to_string(),
            frequency: "Daily".to_string(),
        })
        .collect()
}

fn seed_audit() -> VecDeque<AuditEntry> {
    [
        ("a1", "2026-01-06T10:00:00Z", "Note Analysis", "Dr. Smith", "Success"),
        ("a2", "2026-01-06T10:15:00Z", "Prescription OCR", "Scanner-01", "Success"),
        ("a3", "2026-01-06T10:30:00Z", "Interaction Check", "Dr. Smith", "Warning"),
    ]
    .into_iter()
    .map(|(id, timestamp, action, user, status)| AuditEntry {
        id: id.to_string(),
        timestamp: timestamp.to_string(),
        action: action.to_string(),
        user: user.to_string(),
        status: status.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_date_time;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "h".to_string(),
            full_name: None,
            role,
            organization_id: None,
            specialization: None,
            availability: None,
        }
    }

    fn doctor(org: i64, name: &str, specialization: &str) -> NewUser {
        NewUser {
            full_name: Some(name.to_string()),
            organization_id: Some(org),
            specialization: Some(specialization.to_string()),
            ..new_user(&format!("{}@org.test", name.replace(' ', ".")), Role::Doctor)
        }
    }

    fn appointment(doctor_id: i64, patient: &str, when: &str) -> AppointmentRecord {
        AppointmentRecord {
            id: 0,
            organization_id: 1,
            doctor_id,
            patient_id: None,
            patient_name: patient.to_string(),
            date_time: parse_date_time(when).unwrap(),
            reason: "Checkup".to_string(),
            status: AppointmentStatus::Completed,
            diagnosis: None,
            treatment_notes: None,
        }
    }

    #[test]
    fn test_duplicate_email_is_case_insensitive() {
        let store = Store::new();
        store.create_user(new_user("Ann@Example.com", Role::Patient)).unwrap();
        let err = store
            .create_user(new_user("ann@example.com ", Role::Patient))
            .unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[test]
    fn test_organization_registration_is_all_or_nothing() {
        let store = Store::new();
        store.create_user(new_user("taken@x.org", Role::Patient)).unwrap();

        let err = store
            .create_organization("Mercy", new_user("taken@x.org", Role::OrgAdmin))
            .unwrap_err();
        assert_eq!(err.to_string(), "Admin email already registered");

        let (org, admin) = store
            .create_organization("Mercy", new_user("admin@x.org", Role::OrgAdmin))
            .unwrap();
        assert_eq!(admin.organization_id, Some(org.id));

        let err = store
            .create_organization("Mercy", new_user("other@x.org", Role::OrgAdmin))
            .unwrap_err();
        assert_eq!(err.to_string(), "Organization already exists");
    }

    #[test]
    fn test_doctor_search_matches_name_or_specialization() {
        let store = Store::new();
        store.create_user(doctor(1, "Meredith Grey", "Surgery")).unwrap();
        store.create_user(doctor(1, "Derek Shepherd", "Neurology")).unwrap();
        store.create_user(doctor(2, "Other Grey", "Surgery")).unwrap();

        assert_eq!(store.doctors_in(1, None).len(), 2);
        assert_eq!(store.doctors_in(1, Some("GREY")).len(), 1);
        assert_eq!(store.doctors_in(1, Some("neuro")).len(), 1);
        assert_eq!(store.directory(Some("surg")).len(), 2);
    }

    #[test]
    fn test_update_ignores_blank_fields_and_delete_frees_email() {
        let store = Store::new();
        let d = store.create_user(doctor(1, "Meredith Grey", "Surgery")).unwrap();

        store
            .update_doctor(
                d.id,
                DoctorUpdateRequest {
                    full_name: Some("".into()),
                    specialization: Some("Cardiology".into()),
                    availability: None,
                },
            )
            .unwrap();
        let updated = store.user(d.id).unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Meredith Grey"));
        assert_eq!(updated.specialization.as_deref(), Some("Cardiology"));

        store.delete_doctor(d.id).unwrap();
        assert!(store.delete_doctor(d.id).is_err());
        assert!(store.user_by_email(&d.email).is_none());
    }

    #[test]
    fn test_history_and_ordering() {
        let store = Store::new();
        store.create_appointment(appointment(5, "Ann Lee", "2026-01-01T09:00:00"));
        let later = store.create_appointment(appointment(5, "Ann Lee", "2026-02-01T09:00:00"));
        store.create_appointment(appointment(5, "Bob", "2026-03-01T09:00:00"));

        assert_eq!(store.patient_history("ann").len(), 0);

        store
            .transition_appointment(later.id, AppointmentStatus::Completed, |a| {
                a.diagnosis = Some("Flu".into())
            })
            .unwrap();
        let history = store.patient_history("ANN");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].diagnosis.as_deref(), Some("Flu"));

        let schedule = store.doctor_appointments(5);
        assert!(schedule.windows(2).all(|w| w[0].date_time <= w[1].date_time));
    }

    #[test]
    fn test_terminal_appointment_cannot_move() {
        let store = Store::new();
        let appt = store.create_appointment(appointment(5, "Ann", "2026-01-01"));
        store
            .transition_appointment(appt.id, AppointmentStatus::Cancelled, |_| {})
            .unwrap();
        let err = store
            .transition_appointment(appt.id, AppointmentStatus::Completed, |_| {})
            .unwrap_err();
        assert_eq!(err.to_string(), "Appointment is already Cancelled");
        assert!(store
            .transition_appointment(999, AppointmentStatus::Cancelled, |_| {})
            .is_err());
    }

    #[tokio::test]
    async fn test_seeds_and_adherence_audit() {
        let store = Store::new();
        let meds = store.medications().await;
        assert_eq!(meds[0].name, "Metformin");
        assert_eq!(meds[1].id, "2");
        assert_eq!(store.audit_log().await.len(), 3);

        let mut entry = Map::new();
        entry.insert("medication_id".into(), Value::from("1"));
        entry.insert("status".into(), Value::from("taken"));
        store.log_adherence(entry).await;

        let audit = store.audit_log().await;
        assert_eq!(audit[0].action, "Adherence Log: 1");
        assert_eq!(audit[0].status, "taken");
        assert_eq!(audit[0].user, "System");
        assert_eq!(store.adherence_count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_medication() {
        let store = Store::new();
        let err = store.remove_medication("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Medication not found");
    }
}
