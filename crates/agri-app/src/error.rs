//! Workflow-level errors and the messages shown for them.

use agri_services::{GeminiError, HistoryError, WebSearchError};
use thiserror::Error;

pub const SOIL_ANALYSIS_FAILED: &str =
    "Failed to analyze soil. Please try again with a clear soil image.";
pub const PLANTING_GUIDE_FAILED: &str = "Failed to load planting guide. Please try again.";
pub const DISEASE_ANALYSIS_FAILED: &str = "Failed to analyze the image. Please try again.";
pub const CHAT_APOLOGY: &str = "Sorry, I'm having trouble connecting. Please try again later.";

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Soil analysis failed: {0}")]
    SoilAnalysis(#[source] GeminiError),

    #[error("Planting guide failed: {0}")]
    PlantingGuide(#[source] GeminiError),

    #[error("Disease analysis failed: {0}")]
    DiseaseAnalysis(#[source] GeminiError),

    #[error("Chat failed: {0}")]
    Chat(#[source] GeminiError),

    #[error("Could not read image: {0}")]
    Image(#[source] GeminiError),

    #[error("Scan history error: {0}")]
    History(#[from] HistoryError),

    #[error("Search failed: {0}")]
    Search(#[from] WebSearchError),
}

impl WorkflowError {
    /// Message for the screen the error happened on.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::SoilAnalysis(_) => SOIL_ANALYSIS_FAILED,
            Self::PlantingGuide(_) => PLANTING_GUIDE_FAILED,
            Self::DiseaseAnalysis(_) => DISEASE_ANALYSIS_FAILED,
            Self::Chat(_) => CHAT_APOLOGY,
            Self::Image(e) => e.user_message(),
            Self::History(HistoryError::Read(_)) => "Unable to read saved scans.",
            Self::History(_) => "Failed to save the scan. Please try again.",
            Self::Search(e) => e.user_message(),
        }
    }
}
