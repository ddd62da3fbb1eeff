use tracing::info;

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{
    Appointment, AppointmentStatus, Doctor, DoctorUpdate, NewAppointment, NewDoctor,
};

use super::record;

/// Organization admin console over the organization's doctors and
/// appointments. Every mutation refetches the list it touched.
pub struct OrgConsole {
    client: ApiClient,
    organization_id: i64,
    pub search: String,
    pub doctors: Vec<Doctor>,
    pub appointments: Vec<Appointment>,
    pub error: Option<String>,
}

impl OrgConsole {
    pub fn new(client: ApiClient, organization_id: i64) -> Self {
        Self {
            client,
            organization_id,
            search: String::new(),
            doctors: Vec::new(),
            appointments: Vec::new(),
            error: None,
        }
    }

    pub fn organization_id(&self) -> i64 {
        self.organization_id
    }

    pub async fn load_doctors(&mut self) -> Result<()> {
        self.error = None;
        let fetched = self
            .client
            .get_doctors(self.organization_id, &self.search)
            .await;
        self.doctors = record(&mut self.error, fetched)?;
        Ok(())
    }

    pub async fn search_doctors(&mut self, term: &str) -> Result<()> {
        self.search = term.trim().to_string();
        self.load_doctors().await
    }

    pub async fn add_doctor(
        &mut self,
        full_name: &str,
        email: &str,
        password: &str,
        specialization: Option<&str>,
        availability: Option<&str>,
    ) -> Result<()> {
        self.error = None;
        if full_name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            let err = ClientError::validation("Name, email and password are required.");
            return record(&mut self.error, Err(err));
        }
        let doctor = NewDoctor {
            email: email.trim().to_string(),
            password: password.to_string(),
            full_name: full_name.trim().to_string(),
            specialization: non_blank(specialization),
            availability: non_blank(availability),
            organization_id: self.organization_id,
        };
        let added = self.client.add_doctor(&doctor).await;
        record(&mut self.error, added)?;
        info!(organization_id = self.organization_id, "Doctor added");
        self.load_doctors().await
    }

    pub async fn update_doctor(&mut self, id: i64, update: DoctorUpdate) -> Result<()> {
        self.error = None;
        let updated = self.client.update_doctor(id, &update).await;
        record(&mut self.error, updated)?;
        self.load_doctors().await
    }

    pub async fn delete_doctor(&mut self, id: i64) -> Result<()> {
        self.error = None;
        let deleted = self.client.delete_doctor(id).await;
        record(&mut self.error, deleted)?;
        self.load_doctors().await
    }

    pub async fn load_appointments(&mut self) -> Result<()> {
        self.error = None;
        let fetched = self.client.get_appointments(self.organization_id).await;
        self.appointments = record(&mut self.error, fetched)?;
        Ok(())
    }

    pub async fn create_appointment(
        &mut self,
        doctor_id: i64,
        patient_name: &str,
        date_time: &str,
        reason: &str,
    ) -> Result<()> {
        self.error = None;
        if patient_name.trim().is_empty() || date_time.trim().is_empty() {
            let err = ClientError::validation("Patient name and date are required.");
            return record(&mut self.error, Err(err));
        }
        let appointment = NewAppointment {
            doctor_id,
            organization_id: self.organization_id,
            patient_id: None,
            patient_name: patient_name.trim().to_string(),
            date_time: date_time.trim().to_string(),
            reason: reason.trim().to_string(),
        };
        let created = self.client.create_appointment(&appointment).await;
        record(&mut self.error, created)?;
        self.load_appointments().await
    }

    /// Moves a scheduled appointment to a final status.
    pub async fn set_appointment_status(
        &mut self,
        id: i64,
        status: AppointmentStatus,
    ) -> Result<()> {
        self.error = None;
        let allowed = self
            .appointments
            .iter()
            .find(|a| a.id == id)
            .is_some_and(|a| a.status.can_transition_to(status));
        if !allowed {
            let err = ClientError::validation(format!(
                "Appointment {} cannot be marked {}.",
                id, status
            ));
            return record(&mut self.error, Err(err));
        }
        let updated = self.client.update_appointment(id, status).await;
        record(&mut self.error, updated)?;
        self.load_appointments().await
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
