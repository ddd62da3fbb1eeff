use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{Appointment, ConsultationOutcome, PatientHistoryEntry, User};

use super::record;

/// Doctor dashboard: own schedule, consultation completion and patient history.
pub struct DoctorPortal {
    client: ApiClient,
    doctor: User,
    pub appointments: Vec<Appointment>,
    pub history: Vec<PatientHistoryEntry>,
    pub error: Option<String>,
}

impl DoctorPortal {
    pub fn new(client: ApiClient, doctor: User) -> Self {
        Self {
            client,
            doctor,
            appointments: Vec::new(),
            history: Vec::new(),
            error: None,
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.error = None;
        let fetched = self.client.get_doctor_appointments(self.doctor.user_id).await;
        self.appointments = record(&mut self.error, fetched)?;
        Ok(())
    }

    pub async fn complete(
        &mut self,
        appointment_id: i64,
        diagnosis: &str,
        treatment_notes: &str,
    ) -> Result<()> {
        self.error = None;
        let completable = self
            .appointments
            .iter()
            .find(|a| a.id == appointment_id)
            .is_some_and(Appointment::can_complete);
        if !completable {
            let err = ClientError::validation("Only scheduled appointments can be completed.");
            return record(&mut self.error, Err(err));
        }
        if diagnosis.trim().is_empty() {
            return record(
                &mut self.error,
                Err(ClientError::validation("Diagnosis is required.")),
            );
        }

        let outcome = ConsultationOutcome {
            diagnosis: diagnosis.trim().to_string(),
            treatment_notes: treatment_notes.trim().to_string(),
        };
        let completed = self.client.complete_appointment(appointment_id, &outcome).await;
        record(&mut self.error, completed)?;
        self.load().await
    }

    pub async fn search_history(&mut self, patient_name: &str) -> Result<()> {
        self.error = None;
        if patient_name.trim().is_empty() {
            self.history.clear();
            return Ok(());
        }
        let fetched = self.client.get_patient_history(patient_name.trim()).await;
        self.history = record(&mut self.error, fetched)?;
        Ok(())
    }
}
