use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::models::{Ack, Appointment, Doctor, NewAppointment, ProfileUpdate};

use super::encode;

impl ApiClient {
    /// Public doctor directory across organizations.
    pub async fn get_all_doctors(&self, specialization: &str) -> Result<Vec<Doctor>> {
        let path = format!("/doctors?specialization={}", encode(specialization));
        self.get(Service::Patient, &path).await
    }

    pub async fn get_my_appointments(&self, patient_id: i64) -> Result<Vec<Appointment>> {
        let path = format!("/patient/appointments?patient_id={}", patient_id);
        self.get(Service::Patient, &path).await
    }

    pub async fn book_appointment(&self, appointment: &NewAppointment) -> Result<Ack> {
        self.post(Service::Patient, "/patient/appointments", appointment)
            .await
    }

    pub async fn cancel_my_appointment(&self, id: i64) -> Result<Ack> {
        let path = format!("/patient/appointments/{}/cancel", id);
        self.put_empty(Service::Patient, &path).await
    }

    pub async fn update_profile(&self, patient_id: i64, update: &ProfileUpdate) -> Result<Ack> {
        let path = format!("/patient/profile?patient_id={}", patient_id);
        self.put(Service::Patient, &path, update).await
    }
}

#[cfg(test)]
mod tests {
    use crate::models::ProfileUpdate;
    use crate::testing::{MockTransport, client_with};
    use crate::transport::RequestBody;
    use serde_json::json;

    #[tokio::test]
    async fn test_cancel_sends_no_body() {
        let transport = MockTransport::new().respond_json(200, json!({"status": "success"}));
        let (client, transport) = client_with(transport);

        client.cancel_my_appointment(5).await.unwrap();

        let call = &transport.calls()[0];
        assert_eq!(call.method, reqwest::Method::PUT);
        assert_eq!(call.url, "http://patient.test/api/patient/appointments/5/cancel");
        assert_eq!(call.body, RequestBody::Empty);
    }

    #[tokio::test]
    async fn test_profile_update_omits_blank_password() {
        let transport = MockTransport::new().respond_json(200, json!({"status": "success"}));
        let (client, transport) = client_with(transport);

        client
            .update_profile(
                4,
                &ProfileUpdate {
                    full_name: "Ann Lee".into(),
                    password: None,
                },
            )
            .await
            .unwrap();

        let call = &transport.calls()[0];
        assert_eq!(call.url, "http://patient.test/api/patient/profile?patient_id=4");
        assert_eq!(call.body, RequestBody::Json(json!({"full_name": "Ann Lee"})));
    }
}
