//! Speech-to-text: an explicitly constructed, shared transcription handle.
//!
//! `Transcriber` is built once at startup (loading a model is expensive), cloned into
//! `AppState` (clones share the loaded model), and torn down with `shutdown()` when the
//! server stops.
//! The backend is pluggable via the `SpeechModel` trait.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

pub mod whisper_cli;

use whisper_cli::{WhisperCliModel, WhisperCliSettings};

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech model failed to load: {0}")]
    ModelLoad(String),

    #[error("Audio I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transcription failed: {0}")]
    Inference(String),

    #[error("Audio payload is empty")]
    EmptyAudio,
}

/// A loaded speech model. Implementations must be safe to call concurrently.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Transcribes the audio file at `path`, returning segment texts in order.
    async fn transcribe_file(&self, path: &Path, language: &str)
        -> Result<Vec<String>, SpeechError>;

    /// Releases model resources. Called once at process shutdown.
    async fn unload(&self) {}
}

/// Shared handle over a loaded speech model.
#[derive(Clone)]
pub struct Transcriber {
    model: Arc<dyn SpeechModel>,
}

impl Transcriber {
    pub fn new(model: Arc<dyn SpeechModel>) -> Self {
        Self { model }
    }

    /// Loads the whisper.cpp backend. Expensive; call once at startup.
    pub fn load(settings: WhisperCliSettings) -> Result<Self, SpeechError> {
        let model = WhisperCliModel::load(settings)?;
        Ok(Self::new(Arc::new(model)))
    }

    /// Transcribes raw audio bytes into one transcript string.
    ///
    /// The bytes are written, on the blocking pool, to a temporary file that exists only
    /// for this call and is removed when the guard drops, whether inference succeeds or
    /// fails. A failed removal is ignored.
    pub async fn transcribe(&self, audio: Bytes, language: &str) -> Result<String, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        let bytes = audio.len();
        let audio_file = tokio::task::spawn_blocking(move || write_temp_audio(&audio))
            .await
            .map_err(std::io::Error::other)??;

        debug!(
            bytes,
            language, "Transcribing audio via {}",
            audio_file.path().display()
        );
        let segments = self
            .model
            .transcribe_file(audio_file.path(), language)
            .await?;

        Ok(join_segments(&segments))
    }

    pub async fn shutdown(&self) {
        self.model.unload().await;
    }
}

fn write_temp_audio(audio: &[u8]) -> Result<NamedTempFile, SpeechError> {
    let mut audio_file = tempfile::Builder::new()
        .prefix("siapkerja-stt-")
        .suffix(".wav")
        .tempfile()?;
    audio_file.write_all(audio)?;
    audio_file.flush()?;
    Ok(audio_file)
}

fn join_segments(segments: &[String]) -> String {
    segments
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
