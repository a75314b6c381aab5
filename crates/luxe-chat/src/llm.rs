//! Text-generation collaborator.
//!
//! `LlmClient` is the seam the orchestrator depends on; `GeminiClient` is the
//! production implementation speaking the Gemini `generateContent` REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use luxe_core::config::LlmConfig;

/// Errors from a generation call.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{0}")]
    Config(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("model returned no text")]
    EmptyResponse,
}

impl LlmError {
    /// Transport failures, rate limiting, and server errors are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Config(_) | LlmError::EmptyResponse => false,
        }
    }
}

/// Stateless single-prompt text completion.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a reply for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub candidate_count: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl From<&LlmConfig> for GenerationParams {
    fn from(config: &LlmConfig) -> Self {
        Self {
            candidate_count: config.candidate_count,
            temperature: config.temperature,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Google Gemini client.
pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    api_base: String,
    /// Model name without the `models/` prefix.
    model: String,
    params: GenerationParams,
    max_retries: u32,
}

impl GeminiClient {
    /// Build a client from configuration. Fails if no API key is set.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        if !config.api_key_configured() {
            return Err(LlmError::Config("LLM API key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: SecretString::new(config.api_key.trim().to_string()),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.trim_start_matches("models/").to_string(),
            params: GenerationParams::from(config),
            max_retries: config.max_retries,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                candidate_count: self.params.candidate_count,
                temperature: self.params.temperature,
                top_p: self.params.top_p,
                max_output_tokens: self.params.max_output_tokens,
            },
        };

        // The key travels in a header so it never appears in error URLs,
        // which end up in user-facing fallback replies.
        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.api_base, self.model
            ))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<GeminiError>().await {
                Ok(body) => body.error.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            };
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GeminiResponse = response.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!(
            model = %self.model,
            "Sending prompt to Gemini: {}...",
            preview(prompt)
        );

        let mut attempt = 0;
        loop {
            match self.generate_once(prompt).await {
                Ok(text) => {
                    debug!("Gemini response: {}...", preview(&text));
                    return Ok(text);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let backoff = Duration::from_millis(
                        250u64.saturating_mul(2u64.saturating_pow(attempt - 1)),
                    );
                    warn!(error = %e, attempt, ?backoff, "Gemini call failed, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    error!(error = %e, "Error in Gemini chat completion");
                    return Err(e);
                }
            }
        }
    }
}

/// First 200 characters, for logs.
fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}

// Internal types for the Gemini API

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    candidate_count: u32,
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}
