use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::models::{Ack, Appointment, ConsultationOutcome, PatientHistoryEntry};

use super::encode;

impl ApiClient {
    pub async fn get_doctor_appointments(&self, doctor_id: i64) -> Result<Vec<Appointment>> {
        let path = format!("/doctor/appointments?doctor_id={}", doctor_id);
        self.get(Service::Patient, &path).await
    }

    pub async fn complete_appointment(
        &self,
        id: i64,
        outcome: &ConsultationOutcome,
    ) -> Result<Ack> {
        let path = format!("/doctor/appointments/{}/complete", id);
        self.put(Service::Patient, &path, outcome).await
    }

    /// Completed consultations of patients whose name matches `name`.
    pub async fn get_patient_history(&self, name: &str) -> Result<Vec<PatientHistoryEntry>> {
        let path = format!("/doctor/patients/{}/history", encode(name));
        self.get(Service::Patient, &path).await
    }
}
