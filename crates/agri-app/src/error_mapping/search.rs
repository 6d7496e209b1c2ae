use agri_core::{AppError, ConfigError, ReqwestErrorExt, SearchError};
use agri_services::WebSearchError;

pub(super) fn to_app_error(e: WebSearchError) -> AppError {
    match e {
        WebSearchError::MissingApiKey | WebSearchError::MissingEngineId => {
            AppError::Search(SearchError::NotConfigured)
        }
        WebSearchError::Api { code, message } => {
            AppError::Search(SearchError::ApiError(format!("{}: {}", code, message)))
        }
        WebSearchError::InvalidUrl(e) => AppError::Config(ConfigError::Invalid(e.to_string())),
        WebSearchError::Network(e) => AppError::Network(e.into_network_error()),
    }
}
