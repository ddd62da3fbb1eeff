use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::InteractionReport;

use super::record;

pub const MIN_MEDICATIONS_MESSAGE: &str =
    "Please enter at least 2 medications to check for interactions.";

/// Drug-drug interaction checker over a growable list of medication fields.
pub struct InteractionChecker {
    client: ApiClient,
    medications: Vec<String>,
    pub result: Option<InteractionReport>,
    pub error: Option<String>,
}

impl InteractionChecker {
    /// Starts with two empty fields.
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            medications: vec![String::new(), String::new()],
            result: None,
            error: None,
        }
    }

    pub fn medications(&self) -> &[String] {
        &self.medications
    }

    pub fn add_field(&mut self) {
        self.medications.push(String::new());
    }

    pub fn remove_field(&mut self, index: usize) {
        if index < self.medications.len() {
            self.medications.remove(index);
        }
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.medications.get_mut(index) {
            *slot = value.into();
        }
    }

    /// Replaces all fields at once.
    pub fn set_all<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.medications = values.into_iter().map(Into::into).collect();
    }

    /// Non-empty names as sent to the service.
    pub fn valid_medications(&self) -> Vec<String> {
        self.medications
            .iter()
            .filter(|m| !m.trim().is_empty())
            .cloned()
            .collect()
    }

    pub async fn submit(&mut self) -> Result<()> {
        let medications = self.valid_medications();
        if medications.len() < 2 {
            self.error = Some(MIN_MEDICATIONS_MESSAGE.to_string());
            return Err(ClientError::validation(MIN_MEDICATIONS_MESSAGE));
        }

        self.error = None;
        self.result = None;
        let checked = self.client.check_interactions(&medications).await;
        self.result = Some(record(&mut self.error, checked)?);
        Ok(())
    }
}
