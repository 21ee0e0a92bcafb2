use crate::config::Config;
use crate::generation::CareerAssistant;
use crate::speech::Transcriber;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub assistant: CareerAssistant,
    /// Loaded once at startup; clones share the model. `None` when no speech model is configured.
    pub transcriber: Option<Transcriber>,
    pub config: Config,
}
