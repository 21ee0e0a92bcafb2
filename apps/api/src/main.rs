mod config;
mod document;
mod errors;
mod generation;
mod llm_client;
mod routes;
mod speech;
mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::CareerAssistant;
use crate::llm_client::ModelClient;
use crate::routes::build_router;
use crate::speech::Transcriber;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SiapKerja API v{}", env!("CARGO_PKG_VERSION"));

    let model = ModelClient::new(config.model_settings()).context("Failed to build HTTP client")?;
    info!("Model client initialized (model: {})", model.model());
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; AI endpoints will answer 503");
    }
    if !config.ai_enabled {
        warn!("AI_ENABLED=false; AI endpoints are switched off");
    }

    // Loading the speech model is the expensive step; done once, here
    let transcriber = match config.speech_settings() {
        Some(settings) => {
            let loaded = tokio::task::spawn_blocking(move || Transcriber::load(settings))
                .await
                .context("Speech model loader task failed")?
                .context("Failed to load speech model")?;
            Some(loaded)
        }
        None => {
            info!("STT_MODEL_PATH not set; transcription disabled");
            None
        }
    };

    let state = AppState {
        assistant: CareerAssistant::new(model),
        transcriber: transcriber.clone(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}{}", config.api_prefix);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(transcriber) = transcriber {
        transcriber.shutdown().await;
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
