pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

/// Uploaded CVs arrive base64-encoded inside JSON.
const JSON_BODY_LIMIT: usize = 10 * 1024 * 1024;
const AUDIO_BODY_LIMIT: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_handler))
        .route("/ai/cv-review", post(handlers::handle_cv_review))
        .route(
            "/ai/interview-questions",
            post(handlers::handle_interview_questions),
        )
        .route(
            "/ai/interview-feedback",
            post(handlers::handle_interview_feedback),
        )
        .route("/ai/career-roadmap", post(handlers::handle_career_roadmap))
        .route("/ai/generate", post(handlers::handle_generate))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .route(
            "/ai/transcribe",
            post(handlers::handle_transcribe).layer(DefaultBodyLimit::max(AUDIO_BODY_LIMIT)),
        );

    let router = if state.config.api_prefix.is_empty() {
        api
    } else {
        Router::new().nest(&state.config.api_prefix, api)
    };

    router.with_state(state)
}
