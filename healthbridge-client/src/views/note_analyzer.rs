use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{ClinicalAnalysis, ClinicalNote, CoachingMessage, CoachingRequest};

use super::record;

/// Age sent with coaching requests; the analyzer form does not collect one.
pub const COACHING_PATIENT_AGE: u32 = 45;

#[derive(Debug, Clone, Default)]
pub struct NoteForm {
    pub patient_id: String,
    pub note_text: String,
    pub note_date: Option<String>,
}

impl NoteForm {
    fn to_note(&self) -> ClinicalNote {
        ClinicalNote {
            patient_id: self.patient_id.trim().to_string(),
            note_text: self.note_text.clone(),
            note_date: self.note_date.clone().filter(|d| !d.trim().is_empty()),
        }
    }
}

/// Analysis shown to the user, plus coaching once it arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteAnalysisView {
    pub analysis: ClinicalAnalysis,
    pub coaching: Option<Vec<CoachingMessage>>,
}

/// Clinical note analysis with optional medication coaching and
/// de-identification.
pub struct NoteAnalyzer {
    client: ApiClient,
    pub form: NoteForm,
    pub result: Option<NoteAnalysisView>,
    pub de_identified_text: Option<String>,
    pub error: Option<String>,
}

impl NoteAnalyzer {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            form: NoteForm::default(),
            result: None,
            de_identified_text: None,
            error: None,
        }
    }

    /// Analyzes the note. When medications were extracted, one coaching
    /// request follows; its failure is logged and leaves the analysis as is.
    pub async fn submit(&mut self) -> Result<()> {
        self.error = None;
        self.result = None;
        self.de_identified_text = None;

        let validated = self.validate();
        record(&mut self.error, validated)?;

        let note = self.form.to_note();
        let analyzed = self.client.analyze_note(&note).await;
        let analysis = record(&mut self.error, analyzed)?;

        info!(
            conditions = analysis.extracted_entities.conditions.len(),
            medications = analysis.extracted_entities.medications.len(),
            "Clinical note analyzed"
        );

        let wants_coaching = !analysis.extracted_entities.medications.is_empty();
        self.result = Some(NoteAnalysisView {
            analysis,
            coaching: None,
        });

        if wants_coaching {
            self.fetch_coaching().await;
        }
        Ok(())
    }

    async fn fetch_coaching(&mut self) {
        let Some(view) = self.result.as_ref() else {
            return;
        };
        let request = CoachingRequest {
            age: COACHING_PATIENT_AGE,
            medications: view.analysis.extracted_entities.medications.clone(),
            barriers: view
                .analysis
                .adherence_insights
                .as_ref()
                .map(|insights| insights.barriers_identified.clone())
                .unwrap_or_default(),
        };

        match self.client.generate_coaching(&request).await {
            Ok(response) => {
                if let Some(view) = self.result.as_mut() {
                    view.coaching = Some(response.coaching_messages);
                }
            }
            Err(e) => warn!("Coaching fetch failed: {}", e),
        }
    }

    pub async fn de_identify(&mut self) -> Result<()> {
        self.error = None;
        let validated = self.validate();
        record(&mut self.error, validated)?;

        let note = self.form.to_note();
        let outcome = self.client.de_identify(&note).await;
        let response = record(&mut self.error, outcome)?;
        self.de_identified_text = Some(response.de_identified_text);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.form.patient_id.trim().is_empty() || self.form.note_text.trim().is_empty() {
            return Err(ClientError::validation(
                "Patient ID and clinical note text are required.",
            ));
        }
        Ok(())
    }
}
