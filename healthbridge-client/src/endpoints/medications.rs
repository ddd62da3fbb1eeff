use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::models::{Ack, AdherenceLog, Medication, MedicationCreated, NewMedication};

use super::encode;

impl ApiClient {
    pub async fn get_medications(&self) -> Result<Vec<Medication>> {
        self.get(Service::Patient, "/medications").await
    }

    pub async fn add_medication(&self, medication: &NewMedication) -> Result<MedicationCreated> {
        self.post(Service::Patient, "/medications", medication)
            .await
    }

    pub async fn delete_medication(&self, id: &str) -> Result<Ack> {
        self.delete(Service::Patient, &format!("/medications/{}", encode(id)))
            .await
    }

    pub async fn log_adherence(&self, log: &AdherenceLog) -> Result<Ack> {
        self.post(Service::Patient, "/adherence", log).await
    }
}
