//! LLM backends for scoring.
//!
//! Enum dispatch over an OpenAI-compatible chat completions client and an
//! Anthropic Messages client. Both send the rendered system and user
//! prompts and hand back the reply text untouched; score extraction lives
//! in [`crate::parse`].
//!
//! Sampling is greedy and the reply budget is small: the model is asked
//! for a single one-line JSON object.

use serde_json::{Value, json};

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::ReviewerError;
use crate::prompt::RenderedPrompt;

/// Reply token budget. A score object fits comfortably.
const MAX_TOKENS: u32 = 32;

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// An LLM backend that turns a prompt into reply text.
#[derive(Debug)]
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Send a prompt and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewerError::LlmBackend`] if the call fails, the backend
    /// answers with a non-success status, or the reply has no text.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, ReviewerError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Anthropic(backend) => backend.complete(prompt).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }

    /// Model identifier requests are sent with.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(backend) => &backend.model,
            Self::Anthropic(backend) => &backend.model,
        }
    }
}

/// Create an LLM backend from configuration.
pub fn create_backend(config: &LlmBackendConfig) -> LlmBackend {
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config)),
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Client for `{api_url}/chat/completions`.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, ReviewerError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": 0,
            "max_tokens": MAX_TOKENS,
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let json = send("OpenAI", request).await?;
        extract_openai_content(&json)
    }
}

/// Pull `choices[0].message.content` out of a chat completions response.
fn extract_openai_content(json: &Value) -> Result<String, ReviewerError> {
    json.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            ReviewerError::LlmBackend(
                "OpenAI response missing choices[0].message.content".to_owned(),
            )
        })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Client for `{api_url}/messages`.
///
/// The system prompt is a top-level field and the key travels in
/// `x-api-key`.
#[derive(Debug)]
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, ReviewerError> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": 0,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        });

        let request = self
            .client
            .post(format!("{}/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let json = send("Anthropic", request).await?;
        extract_anthropic_content(&json)
    }
}

/// Concatenate the `text` blocks of a Messages API response.
fn extract_anthropic_content(json: &Value) -> Result<String, ReviewerError> {
    let text: String = json
        .get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        Err(ReviewerError::LlmBackend(
            "Anthropic response has no text content".to_owned(),
        ))
    } else {
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Shared transport
// ---------------------------------------------------------------------------

/// Send a prepared request and decode the JSON body of a success response.
async fn send(vendor: &str, request: reqwest::RequestBuilder) -> Result<Value, ReviewerError> {
    let response = request
        .send()
        .await
        .map_err(|e| ReviewerError::LlmBackend(format!("{vendor} request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(ReviewerError::LlmBackend(format!(
            "{vendor} returned {status}: {error_body}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ReviewerError::LlmBackend(format!("{vendor} response parse failed: {e}")))
}
