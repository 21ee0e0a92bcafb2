use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::GenerationError;
use crate::speech::SpeechError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Generation(GenerationError::CredentialMissing) => {
                (StatusCode::SERVICE_UNAVAILABLE, "AI_NOT_CONFIGURED")
            }
            AppError::Generation(GenerationError::RemoteCallFailed { .. }) => {
                (StatusCode::BAD_GATEWAY, "MODEL_CALL_FAILED")
            }
            AppError::Generation(_) => (StatusCode::BAD_GATEWAY, "INVALID_GENERATION"),
            AppError::Speech(SpeechError::EmptyAudio) => (StatusCode::BAD_REQUEST, "EMPTY_AUDIO"),
            AppError::Speech(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TRANSCRIPTION_ERROR"),
            AppError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Validation(msg) | AppError::ServiceUnavailable(msg) => msg.clone(),
            AppError::Generation(GenerationError::CredentialMissing) => {
                "The AI service is not configured".to_string()
            }
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                "The AI model could not produce a result".to_string()
            }
            AppError::Speech(SpeechError::EmptyAudio) => "Audio payload is empty".to_string(),
            AppError::Speech(e) => {
                tracing::error!("Speech error: {e}");
                "Audio transcription failed".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::Generation(e) = &self {
            error["retryable"] = json!(e.is_retryable());
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
