use tracing::info;

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{Appointment, Doctor, NewAppointment, ProfileUpdate, User};

use super::record;

/// Feedback banner shown after a portal action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Patient dashboard: doctor directory, own appointments and profile.
pub struct PatientPortal {
    client: ApiClient,
    patient: User,
    pub specialization: String,
    pub doctors: Vec<Doctor>,
    pub appointments: Vec<Appointment>,
    pub notice: Option<Notice>,
    pub error: Option<String>,
}

impl PatientPortal {
    pub fn new(client: ApiClient, patient: User) -> Self {
        Self {
            client,
            patient,
            specialization: String::new(),
            doctors: Vec::new(),
            appointments: Vec::new(),
            notice: None,
            error: None,
        }
    }

    pub fn patient(&self) -> &User {
        &self.patient
    }

    pub async fn load_doctors(&mut self) -> Result<()> {
        self.error = None;
        let fetched = self.client.get_all_doctors(&self.specialization).await;
        self.doctors = record(&mut self.error, fetched)?;
        Ok(())
    }

    pub async fn load_appointments(&mut self) -> Result<()> {
        self.error = None;
        let fetched = self.client.get_my_appointments(self.patient.user_id).await;
        self.appointments = record(&mut self.error, fetched)?;
        Ok(())
    }

    pub async fn book(&mut self, doctor: &Doctor, date_time: &str, reason: &str) -> Result<()> {
        self.notice = None;
        self.error = None;
        let outcome = self.try_book(doctor, date_time, reason).await;
        self.settle(outcome, "Appointment booked successfully!")
            .await
    }

    async fn try_book(&self, doctor: &Doctor, date_time: &str, reason: &str) -> Result<()> {
        let organization_id = doctor.organization_id.ok_or_else(|| {
            ClientError::validation("Selected doctor is not attached to an organization.")
        })?;
        if date_time.trim().is_empty() || reason.trim().is_empty() {
            return Err(ClientError::validation("Date and reason are required."));
        }
        let appointment = NewAppointment {
            doctor_id: doctor.id,
            organization_id,
            patient_id: Some(self.patient.user_id),
            patient_name: self.patient.user_name.clone(),
            date_time: date_time.trim().to_string(),
            reason: reason.trim().to_string(),
        };
        self.client.book_appointment(&appointment).await?;
        info!(doctor_id = doctor.id, "Appointment booked");
        Ok(())
    }

    /// Only scheduled appointments can be cancelled; anything else is
    /// rejected without a request.
    pub async fn cancel(&mut self, appointment_id: i64) -> Result<()> {
        self.notice = None;
        self.error = None;
        let cancellable = self
            .appointments
            .iter()
            .find(|a| a.id == appointment_id)
            .is_some_and(Appointment::can_cancel);
        let outcome = if cancellable {
            self.client
                .cancel_my_appointment(appointment_id)
                .await
                .map(|_| ())
        } else {
            Err(ClientError::validation(
                "Only scheduled appointments can be cancelled.",
            ))
        };
        self.settle(outcome, "Appointment cancelled.").await
    }

    /// Takes effect in the displayed name only after signing in again.
    pub async fn update_profile(&mut self, full_name: &str, password: Option<&str>) -> Result<()> {
        self.notice = None;
        self.error = None;
        let update = ProfileUpdate {
            full_name: full_name.trim().to_string(),
            password: password.filter(|p| !p.is_empty()).map(str::to_string),
        };
        let outcome = if update.full_name.is_empty() {
            Err(ClientError::validation("Full name is required."))
        } else {
            self.client
                .update_profile(self.patient.user_id, &update)
                .await
                .map(|_| ())
        };
        match outcome {
            Ok(()) => {
                self.notice = Some(Notice::Success(
                    "Profile updated. Please re-login to see changes.".to_string(),
                ));
                Ok(())
            }
            Err(e) => {
                self.notice = Some(Notice::Error(e.message()));
                record(&mut self.error, Err(e))
            }
        }
    }

    /// Sets the banner and refetches the appointment list after a successful action.
    async fn settle(&mut self, outcome: Result<()>, success: &str) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.notice = Some(Notice::Success(success.to_string()));
                self.load_appointments().await
            }
            Err(e) => {
                self.notice = Some(Notice::Error(e.message()));
                record(&mut self.error, Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, Role};
    use crate::testing::{MockTransport, client_with};
    use serde_json::json;

    fn patient() -> User {
        User {
            user_id: 11,
            user_name: "Ann Lee".into(),
            email: "ann@example.com".into(),
            role: Role::Patient,
            organization: None,
        }
    }

    fn appointment(status: &str) -> serde_json::Value {
        json!({
            "id": 5,
            "doctor_name": "Dr. Grey",
            "specialization": "Cardiology",
            "date_time": "2026-11-02T10:00:00",
            "reason": "Chest pain",
            "status": status
        })
    }

    #[tokio::test]
    async fn test_cancel_scheduled_refetches_and_hides_action() {
        let transport = MockTransport::new()
            .respond_json(200, json!([appointment("Scheduled")]))
            .respond_json(200, json!({"status": "success"}))
            .respond_json(200, json!([appointment("Cancelled")]));
        let (client, transport) = client_with(transport);
        let mut portal = PatientPortal::new(client, patient());

        portal.load_appointments().await.unwrap();
        assert!(portal.appointments[0].can_cancel());
        portal.cancel(5).await.unwrap();

        assert_eq!(transport.calls().len(), 3);
        assert_eq!(portal.appointments[0].status, AppointmentStatus::Cancelled);
        assert!(!portal.appointments[0].can_cancel());
        assert_eq!(
            portal.notice,
            Some(Notice::Success("Appointment cancelled.".into()))
        );
    }

    #[tokio::test]
    async fn test_cancel_completed_makes_no_call() {
        let transport = MockTransport::new().respond_json(200, json!([appointment("Completed")]));
        let (client, transport) = client_with(transport);
        let mut portal = PatientPortal::new(client, patient());

        portal.load_appointments().await.unwrap();
        assert!(portal.cancel(5).await.is_err());

        assert_eq!(transport.calls().len(), 1);
        assert!(matches!(portal.notice, Some(Notice::Error(_))));
    }

    #[tokio::test]
    async fn test_book_sends_patient_identity_and_refetches() {
        let transport = MockTransport::new()
            .respond_json(200, json!({"status": "success"}))
            .respond_json(200, json!([appointment("Scheduled")]));
        let (client, transport) = client_with(transport);
        let mut portal = PatientPortal::new(client, patient());
        let doctor: Doctor = serde_json::from_value(json!({
            "id": 3, "full_name": "Dr. Grey", "organization_id": 9, "rating": 4.5
        }))
        .unwrap();

        portal.book(&doctor, "2026-11-02T10:00:00", "Chest pain").await.unwrap();

        let call = &transport.calls()[0];
        let crate::transport::RequestBody::Json(body) = &call.body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["patient_id"], 11);
        assert_eq!(body["patient_name"], "Ann Lee");
        assert_eq!(body["organization_id"], 9);
        assert_eq!(
            portal.notice,
            Some(Notice::Success("Appointment booked successfully!".into()))
        );
        assert_eq!(portal.appointments.len(), 1);
    }

    #[tokio::test]
    async fn test_profile_update_notice() {
        let transport = MockTransport::new().respond_json(200, json!({"status": "success"}));
        let (client, _) = client_with(transport);
        let mut portal = PatientPortal::new(client, patient());

        portal.update_profile("Ann B. Lee", Some("")).await.unwrap();

        assert_eq!(
            portal.notice,
            Some(Notice::Success(
                "Profile updated. Please re-login to see changes.".into()
            ))
        );
    }

    #[tokio::test]
    async fn test_directory_filter_is_sent() {
        let transport = MockTransport::new().respond_json(200, json!([]));
        let (client, transport) = client_with(transport);
        let mut portal = PatientPortal::new(client, patient());
        portal.specialization = "Heart & Lungs".into();

        portal.load_doctors().await.unwrap();

        assert_eq!(
            transport.paths(),
            vec!["GET http://patient.test/api/doctors?specialization=Heart%20%26%20Lungs"]
        );
    }

    #[tokio::test]
    async fn test_successful_reload_clears_error() {
        let transport = MockTransport::new()
            .respond_json(500, json!({"detail": "db down"}))
            .respond_json(200, json!([appointment("Scheduled")]))
            .respond_json(500, json!({"detail": "db down"}))
            .respond_json(200, json!([]));
        let (client, _) = client_with(transport);
        let mut portal = PatientPortal::new(client, patient());

        assert!(portal.load_appointments().await.is_err());
        assert_eq!(portal.error.as_deref(), Some("db down"));
        portal.load_appointments().await.unwrap();
        assert_eq!(portal.error, None);

        assert!(portal.load_doctors().await.is_err());
        portal.load_doctors().await.unwrap();
        assert_eq!(portal.error, None);
    }

    #[tokio::test]
    async fn test_failed_action_error_cleared_by_next_action() {
        let transport = MockTransport::new()
            .respond_json(200, json!([appointment("Scheduled")]))
            .respond_json(500, json!({"detail": "db down"}))
            .respond_json(200, json!({"status": "success"}))
            .respond_json(200, json!([appointment("Cancelled")]));
        let (client, _) = client_with(transport);
        let mut portal = PatientPortal::new(client, patient());

        portal.load_appointments().await.unwrap();
        assert!(portal.cancel(5).await.is_err());
        assert_eq!(portal.error.as_deref(), Some("db down"));
        portal.cancel(5).await.unwrap();

        assert_eq!(portal.error, None);
        assert_eq!(
            portal.notice,
            Some(Notice::Success("Appointment cancelled.".into()))
        );
    }
}
