//! Disease detector: leaf photo diagnosis, saved to scan history.

use agri_services::prompts::DISEASE_ANALYSIS_PROMPT;
use agri_services::{GeminiClient, InlineImage, ScanHistory, ScanRecord};
use tracing::instrument;

use crate::error::{WorkflowError, DISEASE_ANALYSIS_FAILED};

/// Outcome of a successful diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseScan {
    pub record: ScanRecord,
    /// False when the history write failed; the diagnosis is still valid
    pub saved: bool,
}

pub struct DiseaseDetectorModel {
    gemini: GeminiClient,
    history: ScanHistory,
    /// Newest first
    records: Vec<ScanRecord>,
    result: Option<String>,
    error: Option<String>,
}

impl DiseaseDetectorModel {
    pub fn new(gemini: GeminiClient, history: ScanHistory) -> Self {
        let mut model = Self {
            gemini,
            history,
            records: Vec::new(),
            result: None,
            error: None,
        };
        model.reload_history();
        model
    }

    pub fn reload_history(&mut self) {
        let mut records = self.history.list();
        records.reverse();
        self.records = records;
    }

    #[instrument(skip_all, fields(mime = %image.mime_type))]
    pub async fn analyze(&mut self, image: &InlineImage) -> Result<DiseaseScan, WorkflowError> {
        self.result = None;
        self.error = None;

        let analysis = match self
            .gemini
            .generate_content_with_image(DISEASE_ANALYSIS_PROMPT, image)
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                self.error = Some(DISEASE_ANALYSIS_FAILED.to_string());
                return Err(WorkflowError::DiseaseAnalysis(e));
            }
        };

        let captured = ScanRecord::capture(image.to_data_url(), analysis.as_str());
        let (record, saved) = match self.history.try_append(captured.clone()) {
            Ok(stored) => (stored, true),
            Err(e) => {
                tracing::error!("Error saving scan to history: {}", e);
                (captured, false)
            }
        };

        self.records.insert(0, record.clone());
        self.result = Some(analysis);
        Ok(DiseaseScan { record, saved })
    }

    pub fn history(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
