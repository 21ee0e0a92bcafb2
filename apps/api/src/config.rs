use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{self, ModelSettings};
use crate::speech::whisper_cli::{self, WhisperCliSettings};

/// Application configuration loaded from environment variables.
/// Everything has a default; a missing `GEMINI_API_KEY` only fails at call time.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Duration,
    pub ai_enabled: bool,
    pub api_prefix: String,
    pub port: u16,
    pub rust_log: String,
    pub stt_binary: PathBuf,
    pub stt_model_path: Option<PathBuf>,
    pub stt_threads: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", llm_client::DEFAULT_MODEL),
            gemini_base_url: env_or("GEMINI_BASE_URL", llm_client::DEFAULT_BASE_URL),
            request_timeout: Duration::from_secs(parse_env(
                "REQUEST_TIMEOUT_SEC",
                llm_client::DEFAULT_TIMEOUT_SECS,
            )?),
            ai_enabled: parse_bool_env("AI_ENABLED", true)?,
            api_prefix: normalize_prefix(&env_or("API_PREFIX", "/api")),
            port: parse_env("PORT", 8000)?,
            rust_log: env_or("RUST_LOG", "info"),
            stt_binary: PathBuf::from(env_or("STT_BINARY", whisper_cli::DEFAULT_BINARY)),
            stt_model_path: optional_env("STT_MODEL_PATH").map(PathBuf::from),
            stt_threads: parse_env("STT_THREADS", whisper_cli::DEFAULT_THREADS)?,
        })
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            base_url: self.gemini_base_url.clone(),
            model: self.gemini_model.clone(),
            api_key: self.gemini_api_key.clone(),
            timeout: self.request_timeout,
        }
    }

    /// `None` when no speech model is configured; transcription is then disabled.
    pub fn speech_settings(&self) -> Option<WhisperCliSettings> {
        self.stt_model_path.as_ref().map(|model_path| WhisperCliSettings {
            binary: self.stt_binary.clone(),
            model_path: model_path.clone(),
            threads: self.stt_threads,
        })
    }
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    match optional_env(key) {
        Some(raw) => parse_bool(&raw)
            .with_context(|| format!("Environment variable '{key}' must be true or false, got '{raw}'")),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Leading slash, no trailing slash; "/" and "" mean no prefix.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with no credential and no speech model.
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: None,
            gemini_model: llm_client::DEFAULT_MODEL.to_string(),
            gemini_base_url: llm_client::DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(llm_client::DEFAULT_TIMEOUT_SECS),
            ai_enabled: true,
            api_prefix: "/api".to_string(),
            port: 8000,
            rust_log: "info".to_string(),
            stt_binary: PathBuf::from(whisper_cli::DEFAULT_BINARY),
            stt_model_path: None,
            stt_threads: whisper_cli::DEFAULT_THREADS,
        }
    }
}
