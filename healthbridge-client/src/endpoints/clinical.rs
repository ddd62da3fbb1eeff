use tracing::info;

use crate::client::ApiClient;
use crate::config::Service;
use crate::error::Result;
use crate::models::{
    AuditEntry, ClinicalAnalysis, ClinicalNote, CoachingRequest, CoachingResponse, DeIdentified,
    InteractionQuery, InteractionReport, PrescriptionScan,
};
use crate::transport::{MultipartForm, UploadFile};

impl ApiClient {
    pub async fn analyze_note(&self, note: &ClinicalNote) -> Result<ClinicalAnalysis> {
        info!("Analyzing clinical note for patient {}", note.patient_id);
        self.post(Service::Ai, "/analyze-note", note).await
    }

    /// Uploads a prescription image as a multipart `file` field.
    pub async fn scan_prescription(&self, file: UploadFile) -> Result<PrescriptionScan> {
        info!("Scanning prescription {}", file.filename);
        let form = MultipartForm::new().file("file", file);
        self.post_multipart(Service::Ai, "/scan-prescription", form)
            .await
    }

    pub async fn check_interactions(&self, medications: &[String]) -> Result<InteractionReport> {
        let query = InteractionQuery {
            medications: medications.to_vec(),
        };
        self.post(Service::Ai, "/check-interactions", &query).await
    }

    pub async fn de_identify(&self, note: &ClinicalNote) -> Result<DeIdentified> {
        self.post(Service::Ai, "/de-identify", note).await
    }

    pub async fn generate_coaching(&self, request: &CoachingRequest) -> Result<CoachingResponse> {
        self.post(Service::Ai, "/generate-coaching", request).await
    }

    pub async fn get_audit_logs(&self) -> Result<Vec<AuditEntry>> {
        self.get(Service::Ai, "/audit-log").await
    }
}
