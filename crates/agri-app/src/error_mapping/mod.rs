//! Maps workflow errors to agri_core::AppError for consistent user-facing messages.
//! Each service has its own module to keep mappings small and readable.

mod ai;
mod history;
mod search;

use crate::error::WorkflowError;
use agri_core::AppError;

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::SoilAnalysis(e)
            | WorkflowError::DiseaseAnalysis(e)
            | WorkflowError::Image(e) => ai::image_error(e),
            WorkflowError::PlantingGuide(e) => ai::generation_error(e),
            WorkflowError::Chat(e) => ai::chat_error(e),
            WorkflowError::History(e) => history::to_app_error(e),
            WorkflowError::Search(e) => search::to_app_error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_core::{AiError, NetworkError, SearchError, StorageError};
    use agri_services::{GeminiError, HistoryError, WebSearchError};

    #[test]
    fn test_image_failures_map_to_image_analysis() {
        let e = WorkflowError::DiseaseAnalysis(GeminiError::EmptyResponse);
        let app: AppError = e.into();
        assert!(matches!(app, AppError::Ai(AiError::ImageAnalysisFailed(_))));
        assert_eq!(app.user_message(), "Failed to analyze image with AI.");
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let app: AppError = WorkflowError::Chat(GeminiError::NotConfigured).into();
        assert!(matches!(app, AppError::Ai(AiError::NotConfigured)));
    }

    #[test]
    fn test_server_errors_become_network_errors() {
        let app: AppError = WorkflowError::PlantingGuide(GeminiError::Api {
            status: 503,
            message: "overloaded".into(),
        })
        .into();
        assert!(matches!(
            app,
            AppError::Network(NetworkError::ServerError { status: 503, .. })
        ));
    }

    #[test]
    fn test_history_and_search_mapping() {
        let read = HistoryError::Read(anyhow::anyhow!("permission denied"));
        let app: AppError = WorkflowError::History(read).into();
        assert!(matches!(app, AppError::Storage(StorageError::ReadFailed(_))));
        assert_eq!(app.user_message(), "Unable to read saved scans.");

        let write = HistoryError::Write(anyhow::anyhow!("disk full"));
        let app: AppError = WorkflowError::History(write).into();
        assert!(matches!(app, AppError::Storage(StorageError::WriteFailed(_))));

        let app: AppError = WorkflowError::Search(WebSearchError::MissingApiKey).into();
        assert!(matches!(app, AppError::Search(SearchError::NotConfigured)));
    }
}
