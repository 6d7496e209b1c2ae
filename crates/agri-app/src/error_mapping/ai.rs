use agri_core::{AiError, AppError, NetworkError, ReqwestErrorExt};
use agri_services::GeminiError;

/// Mappings shared by every AI call; `Err` hands the error back for context.
fn common(e: GeminiError) -> Result<AppError, GeminiError> {
    match e {
        GeminiError::NotConfigured => Ok(AppError::Ai(AiError::NotConfigured)),
        GeminiError::InvalidImage(s) => Ok(AppError::Ai(AiError::InvalidImage(s))),
        GeminiError::Network(e) => Ok(AppError::Network(e.into_network_error())),
        GeminiError::Api { status, message } if status >= 500 => {
            Ok(AppError::Network(NetworkError::ServerError { status, message }))
        }
        other => Err(other),
    }
}

pub(super) fn image_error(e: GeminiError) -> AppError {
    common(e).unwrap_or_else(|e| AppError::Ai(AiError::ImageAnalysisFailed(e.to_string())))
}

pub(super) fn generation_error(e: GeminiError) -> AppError {
    common(e).unwrap_or_else(|e| AppError::Ai(AiError::GenerationFailed(e.to_string())))
}

pub(super) fn chat_error(e: GeminiError) -> AppError {
    common(e).unwrap_or_else(|e| AppError::Ai(AiError::ChatFailed(e.to_string())))
}
