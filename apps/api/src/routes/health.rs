use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
/// Reports service version and which optional capabilities are live.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "siapkerja-api",
        "model": state.assistant.model_name(),
        "ai_enabled": state.config.ai_enabled,
        "transcription_enabled": state.transcriber.is_some()
    }))
}
