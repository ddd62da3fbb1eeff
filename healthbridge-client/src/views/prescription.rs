use std::collections::HashSet;
use tracing::{error, info};

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{NewMedication, PrescribedMedication, PrescriptionScan};
use crate::transport::UploadFile;

use super::record;

/// Default for dosage and frequency when the scan did not read one.
pub const AS_DIRECTED: &str = "As directed";

/// Prescription image scanner with one-click save into the medication list.
pub struct PrescriptionScanner {
    client: ApiClient,
    file: Option<UploadFile>,
    pub result: Option<PrescriptionScan>,
    pub error: Option<String>,
    saved: HashSet<String>,
}

impl PrescriptionScanner {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            file: None,
            result: None,
            error: None,
            saved: HashSet::new(),
        }
    }

    /// Picking a new file discards the previous scan.
    pub fn select_file(&mut self, file: UploadFile) {
        self.file = Some(file);
        self.result = None;
        self.error = None;
    }

    pub fn selected_file(&self) -> Option<&UploadFile> {
        self.file.as_ref()
    }

    pub fn clear(&mut self) {
        self.file = None;
        self.result = None;
        self.error = None;
    }

    /// Does nothing until a file has been selected.
    pub async fn submit(&mut self) -> Result<()> {
        let Some(file) = self.file.clone() else {
            return Ok(());
        };
        self.error = None;
        self.result = None;

        let scanned = self.client.scan_prescription(file).await;
        let scan = record(&mut self.error, scanned)?;
        info!(medications = scan.medications.len(), "Prescription scanned");
        self.result = Some(scan);
        Ok(())
    }

    pub fn is_saved(&self, name: &str) -> bool {
        self.saved.contains(name)
    }

    /// Adds one scanned medication to the patient's list. Failures are only
    /// logged; the button simply stays available.
    pub async fn save_medication(&mut self, medication: &PrescribedMedication) {
        let new = NewMedication {
            name: medication.name.clone(),
            dosage: non_blank_or_default(medication.dosage.as_deref()),
            frequency: non_blank_or_default(medication.frequency.as_deref()),
        };
        match self.client.add_medication(&new).await {
            Ok(_) => {
                self.saved.insert(medication.name.clone());
            }
            Err(e) => error!("Failed to save medication {}: {}", medication.name, e),
        }
    }
}

fn non_blank_or_default(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(AS_DIRECTED)
        .to_string()
}
