use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::models::{
    Ack, Appointment, AppointmentStatus, AppointmentStatusUpdate, Doctor, DoctorUpdate,
    NewAppointment, NewDoctor,
};

use super::encode;

impl ApiClient {
    pub async fn add_doctor(&self, doctor: &NewDoctor) -> Result<Ack> {
        self.post(Service::Patient, "/org/doctors", doctor).await
    }

    /// Doctors of one organization, optionally filtered by name or specialization.
    pub async fn get_doctors(&self, organization_id: i64, search: &str) -> Result<Vec<Doctor>> {
        let path = format!(
            "/org/doctors?organization_id={}&search={}",
            organization_id,
            encode(search)
        );
        self.get(Service::Patient, &path).await
    }

    pub async fn update_doctor(&self, id: i64, update: &DoctorUpdate) -> Result<Ack> {
        self.put(Service::Patient, &format!("/org/doctors/{}", id), update)
            .await
    }

    pub async fn delete_doctor(&self, id: i64) -> Result<Ack> {
        self.delete(Service::Patient, &format!("/org/doctors/{}", id))
            .await
    }

    pub async fn get_appointments(&self, organization_id: i64) -> Result<Vec<Appointment>> {
        let path = format!("/org/appointments?organization_id={}", organization_id);
        self.get(Service::Patient, &path).await
    }

    pub async fn create_appointment(&self, appointment: &NewAppointment) -> Result<Ack> {
        self.post(Service::Patient, "/org/appointments", appointment)
            .await
    }

    pub async fn update_appointment(&self, id: i64, status: AppointmentStatus) -> Result<Ack> {
        self.put(
            Service::Patient,
            &format!("/org/appointments/{}", id),
            &AppointmentStatusUpdate { status },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::models::AppointmentStatus;
    use crate::testing::{MockTransport, client_with};
    use crate::transport::RequestBody;
    use serde_json::json;

    #[tokio::test]
    async fn test_doctor_search_is_encoded() {
        let transport = MockTransport::new().respond_json(200, json!([]));
        let (client, transport) = client_with(transport);

        client.get_doctors(3, "heart & lung").await.unwrap();

        assert_eq!(
            transport.paths(),
            vec!["GET http://patient.test/api/org/doctors?organization_id=3&search=heart%20%26%20lung"]
        );
    }

    #[tokio::test]
    async fn test_status_update_body() {
        let transport = MockTransport::new().respond_json(200, json!({"status": "success"}));
        let (client, transport) = client_with(transport);

        client
            .update_appointment(8, AppointmentStatus::Completed)
            .await
            .unwrap();

        let call = &transport.calls()[0];
        assert_eq!(call.url, "http://patient.test/api/org/appointments/8");
        assert_eq!(call.body, RequestBody::Json(json!({"status": "Completed"})));
    }
}
