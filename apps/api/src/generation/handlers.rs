//! Axum route handlers for the AI endpoints.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::generation::models::{
    CareerRoadmapRequest, CareerRoadmapResult, CvReviewRequest, CvReviewResult,
    GenerationRequest, InterviewFeedbackRequest, InterviewFeedbackResult,
    InterviewQuestionsRequest, InterviewQuestionsResult, TypedResult, DEFAULT_LANGUAGE,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub text: String,
    pub language: String,
}

fn ensure_ai_enabled(state: &AppState) -> Result<(), AppError> {
    if !state.config.ai_enabled {
        return Err(AppError::ServiceUnavailable(
            "AI features are disabled".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/ai/cv-review
pub async fn handle_cv_review(
    State(state): State<AppState>,
    Json(request): Json<CvReviewRequest>,
) -> Result<Json<CvReviewResult>, AppError> {
    ensure_ai_enabled(&state)?;
    request.validate()?;

    Ok(Json(state.assistant.review_cv(&request).await?))
}

/// POST /api/ai/interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Json(request): Json<InterviewQuestionsRequest>,
) -> Result<Json<InterviewQuestionsResult>, AppError> {
    ensure_ai_enabled(&state)?;
    request.validate()?;

    Ok(Json(state.assistant.interview_questions(&request).await?))
}

/// POST /api/ai/interview-feedback
pub async fn handle_interview_feedback(
    State(state): State<AppState>,
    Json(request): Json<InterviewFeedbackRequest>,
) -> Result<Json<InterviewFeedbackResult>, AppError> {
    ensure_ai_enabled(&state)?;
    request.validate()?;

    Ok(Json(state.assistant.interview_feedback(&request).await?))
}

/// POST /api/ai/career-roadmap
pub async fn handle_career_roadmap(
    State(state): State<AppState>,
    Json(request): Json<CareerRoadmapRequest>,
) -> Result<Json<CareerRoadmapResult>, AppError> {
    ensure_ai_enabled(&state)?;
    request.validate()?;

    Ok(Json(state.assistant.career_roadmap(&request).await?))
}

/// POST /api/ai/generate
///
/// Single entry point taking a `"task"`-tagged request; the response carries the same tag.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<TypedResult>, AppError> {
    ensure_ai_enabled(&state)?;
    request.validate()?;

    Ok(Json(state.assistant.generate(&request).await?))
}

/// POST /api/ai/transcribe
///
/// Multipart body: `audio` (required, raw bytes) and `language` (optional, default "id").
pub async fn handle_transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, AppError> {
    let transcriber = state.transcriber.clone().ok_or_else(|| {
        AppError::ServiceUnavailable("Speech transcription is not configured".to_string())
    })?;

    let mut audio: Option<Bytes> = None;
    let mut language = DEFAULT_LANGUAGE.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read audio: {e}")))?;
                audio = Some(bytes);
            }
            "language" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read language: {e}")))?;
                if !value.trim().is_empty() {
                    language = value.trim().to_string();
                }
            }
            _ => {}
        }
    }

    let audio = audio.ok_or_else(|| AppError::Validation("audio field is required".to_string()))?;
    info!(bytes = audio.len(), language = %language, "Transcribing uploaded audio");

    let text = transcriber.transcribe(audio, &language).await?;
    Ok(Json(TranscriptionResponse { text, language }))
}
