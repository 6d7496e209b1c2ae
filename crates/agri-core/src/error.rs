//! Centralized error types for the AgriGenius application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("AI service error: {0}")]
    Ai(#[from] AiError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Ai(e) => e.user_message(),
            AppError::Search(e) => e.user_message(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Local storage errors (scan history, caches).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::ReadFailed(_) => "Unable to read saved scans.",
            StorageError::WriteFailed(_) => "Failed to save the scan. Please try again.",
            StorageError::Corruption(_) => {
                "Saved scans may be corrupted. Consider clearing app data."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Generative AI errors.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI API key not configured")]
    NotConfigured,

    #[error("Content generation failed: {0}")]
    GenerationFailed(String),

    #[error("Image analysis failed: {0}")]
    ImageAnalysisFailed(String),

    #[error("Chat failed: {0}")]
    ChatFailed(String),

    #[error("Unsupported image: {0}")]
    InvalidImage(String),
}

impl AiError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AiError::NotConfigured => "AI features are not configured. Add a Gemini API key.",
            AiError::GenerationFailed(_) => "Failed to get response from AI.",
            AiError::ImageAnalysisFailed(_) => "Failed to analyze image with AI.",
            AiError::ChatFailed(_) => {
                "Sorry, I'm having trouble connecting. Please try again later."
            }
            AiError::InvalidImage(_) => "That file doesn't look like an image.",
        }
    }
}

/// Web search errors.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search not configured")]
    NotConfigured,

    #[error("Search API error: {0}")]
    ApiError(String),
}

impl SearchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SearchError::NotConfigured => "Web search is not configured.",
            SearchError::ApiError(_) => "Search failed. Please try again.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Network(NetworkError::Timeout),
            AppError::Storage(StorageError::WriteFailed("disk full".into())),
            AppError::Config(ConfigError::Invalid("test".into())),
            AppError::Storage(StorageError::ReadFailed("denied".into())),
            AppError::Ai(AiError::NotConfigured),
            AppError::Search(SearchError::NotConfigured),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty(), "{:?}", err);
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let ai_err = AiError::GenerationFailed("boom".into());
        let app_err: AppError = ai_err.into();
        assert!(matches!(app_err, AppError::Ai(AiError::GenerationFailed(_))));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Ai(AiError::ImageAnalysisFailed("bad".into()));
        assert_eq!(app_err.user_message(), "Failed to analyze image with AI.");
    }

    #[test]
    fn test_server_error_message_depends_on_status() {
        let server = NetworkError::ServerError {
            status: 503,
            message: "down".into(),
        };
        let client = NetworkError::ServerError {
            status: 400,
            message: "bad".into(),
        };
        assert!(server.user_message().contains("later"));
        assert!(!client.user_message().contains("later"));
    }
}
