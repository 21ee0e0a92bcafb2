/// Model client: the single point of entry for all Gemini calls in SiapKerja.
///
/// ARCHITECTURAL RULE: No other module may call the generative-model API directly.
/// All model interactions MUST go through this module.
///
/// One `generate` call is exactly one HTTP round trip. There is no retry loop here:
/// callers own retry policy and use `GenerationError::is_retryable` to decide.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod sanitize;
#[cfg(test)]
pub mod test_support;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error body logged on non-success responses is cut to this many characters.
const ERROR_BODY_LOG_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Gemini API key is missing")]
    CredentialMissing,

    #[error("Remote model call failed (status {status:?}, timed out: {timed_out}): {message}")]
    RemoteCallFailed {
        status: Option<u16>,
        timed_out: bool,
        message: String,
    },

    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    #[error("Empty or invalid generation: {0}")]
    EmptyOrInvalidGeneration(String),
}

impl GenerationError {
    /// True for failures a caller may reasonably retry: timeouts, transport errors,
    /// rate limiting and server-side errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::RemoteCallFailed {
                status, timed_out, ..
            } => match status {
                Some(code) => *timed_out || *code == 429 || *code >= 500,
                None => true,
            },
            _ => false,
        }
    }

    fn transport(error: reqwest::Error) -> Self {
        GenerationError::RemoteCallFailed {
            status: error.status().map(|s| s.as_u16()),
            timed_out: error.is_timeout(),
            // The URL carries the API key as a query parameter
            message: error.without_url().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

impl<'a> Content<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            parts: vec![Part { text }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Connection settings for the remote model.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// The single model client used by all generation tasks.
/// Holds no per-request state, so clones can be used from concurrent tasks freely.
#[derive(Clone)]
pub struct ModelClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ModelClient {
    pub fn new(settings: ModelSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model,
            api_key: settings.api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one `generateContent` request and returns the first candidate's text.
    ///
    /// The schema is sent as a generation constraint; the model may still ignore it.
    /// A missing candidate, content, part or text yields an empty string.
    pub async fn generate(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        schema: Option<&Value>,
    ) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationError::CredentialMissing)?;

        let request_body = GenerateContentRequest {
            contents: vec![Content::text(prompt)],
            system_instruction: system_instruction
                .filter(|s| !s.is_empty())
                .map(Content::text),
            generation_config: schema.map(|response_schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema,
            }),
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            constrained = schema.is_some(),
            "Calling generative model"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(GenerationError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "Model API returned {}: {}",
                status,
                body.chars().take(ERROR_BODY_LOG_LIMIT).collect::<String>()
            );
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerationError::RemoteCallFailed {
                status: Some(status.as_u16()),
                timed_out: false,
                message,
            });
        }

        let body = response.text().await.map_err(GenerationError::transport)?;
        let envelope: Value = serde_json::from_str(&body).map_err(|e| {
            GenerationError::MalformedModelOutput(format!("response envelope is not JSON: {e}"))
        })?;

        let text = candidate_text(&envelope);
        debug!(output_chars = text.len(), "Generative model call succeeded");

        Ok(text.to_string())
    }
}

/// Reads `candidates[0].content.parts[0].text`, defaulting to "" at any missing level.
fn candidate_text(envelope: &Value) -> &str {
    envelope
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
}
