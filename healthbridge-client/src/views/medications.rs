use tracing::info;

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{AdherenceLog, AdherenceStatus, Medication, NewMedication};

use super::record;

/// The patient's medication list. Every mutation refetches the list.
pub struct MedicationManager {
    client: ApiClient,
    pub medications: Vec<Medication>,
    pub error: Option<String>,
}

impl MedicationManager {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            medications: Vec::new(),
            error: None,
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.error = None;
        let fetched = self.client.get_medications().await;
        self.medications = record(&mut self.error, fetched)?;
        Ok(())
    }

    pub async fn add(&mut self, medication: NewMedication) -> Result<()> {
        self.error = None;
        if medication.name.trim().is_empty() {
            let err = ClientError::validation("Medication name is required.");
            return record(&mut self.error, Err(err));
        }
        let added = self.client.add_medication(&medication).await;
        let created = record(&mut self.error, added)?;
        info!("Medication {} added", created.data.id);
        self.load().await
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.error = None;
        let deleted = self.client.delete_medication(id).await;
        record(&mut self.error, deleted)?;
        self.load().await
    }

    pub async fn log_adherence(&mut self, id: &str, status: AdherenceStatus) -> Result<()> {
        self.error = None;
        let logged = self.client.log_adherence(&AdherenceLog::now(id, status)).await;
        record(&mut self.error, logged)?;
        self.load().await
    }
}
