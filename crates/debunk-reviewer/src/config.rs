//! Configuration for the scoring service.
//!
//! Everything comes from environment variables. Defaults target a local
//! Ollama instance, so the service starts with no configuration at all.

use crate::error::ReviewerError;

/// Default listening port. The game engine's evaluator points here.
pub const DEFAULT_PORT: u16 = 8080;

/// Default OpenAI-compatible base URL (local Ollama).
pub const DEFAULT_API_URL: &str = "http://localhost:11434/v1";

/// Default model name.
pub const DEFAULT_MODEL: &str = "qwen2.5:1.5b-instruct";

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct ReviewerConfig {
    /// Port the HTTP server binds on `0.0.0.0`.
    pub port: u16,
    /// LLM backend used for scoring.
    pub backend: LlmBackendConfig,
    /// Directory holding `system.j2` / `user.j2` overrides, if any.
    pub templates_dir: Option<String>,
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone)]
pub struct LlmBackendConfig {
    /// Which wire format to speak.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key. Empty for unauthenticated local servers.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions (`OpenAI`, `DeepSeek`, Ollama, vLLM).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

impl BackendType {
    /// Parse a backend name as accepted in `LLM_BACKEND`.
    pub fn parse(name: &str) -> Result<Self, ReviewerError> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" | "vllm" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(ReviewerError::Config(format!(
                "unknown backend type: {other}"
            ))),
        }
    }
}

impl ReviewerConfig {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `REVIEWER_PORT` -- listening port (default 8080)
    /// - `LLM_BACKEND` -- `openai` | `ollama` | `deepseek` | `vllm` | `anthropic` (default `openai`)
    /// - `LLM_API_URL` -- base API URL (default local Ollama)
    /// - `LLM_API_KEY` -- API key (default empty)
    /// - `LLM_MODEL` -- model name
    /// - `TEMPLATES_DIR` -- directory with prompt template overrides
    pub fn from_env() -> Result<Self, ReviewerError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ReviewerError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match var("REVIEWER_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ReviewerError::Config(format!("invalid REVIEWER_PORT: {e}")))?,
            None => DEFAULT_PORT,
        };

        let backend_type = match var("LLM_BACKEND") {
            Some(raw) => BackendType::parse(&raw)?,
            None => BackendType::OpenAi,
        };

        let api_url = var("LLM_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        Ok(Self {
            port,
            backend: LlmBackendConfig {
                backend_type,
                api_url,
                api_key: var("LLM_API_KEY").unwrap_or_default(),
                model: var("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            },
            templates_dir: var("TEMPLATES_DIR"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ReviewerConfig, ReviewerError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ReviewerConfig::from_vars(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend.backend_type, BackendType::OpenAi);
        assert_eq!(config.backend.api_url, DEFAULT_API_URL);
        assert_eq!(config.backend.model, DEFAULT_MODEL);
        assert!(config.backend.api_key.is_empty());
        assert!(config.templates_dir.is_none());
    }

    #[test]
    fn variables_override_defaults() {
        let config = load(&[
            ("REVIEWER_PORT", "9090"),
            ("LLM_BACKEND", "Claude"),
            ("LLM_API_URL", "https://api.anthropic.com/v1/"),
            ("LLM_API_KEY", "sk-test"),
            ("LLM_MODEL", "claude-haiku-4-5"),
            ("TEMPLATES_DIR", "prompts"),
        ])
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.backend.backend_type, BackendType::Anthropic);
        assert_eq!(config.backend.api_url, "https://api.anthropic.com/v1");
        assert_eq!(config.backend.api_key, "sk-test");
        assert_eq!(config.backend.model, "claude-haiku-4-5");
        assert_eq!(config.templates_dir.as_deref(), Some("prompts"));
    }

    #[test]
    fn blank_variables_count_as_unset() {
        let config = load(&[("REVIEWER_PORT", "  "), ("TEMPLATES_DIR", "")]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.templates_dir.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(matches!(
            load(&[("REVIEWER_PORT", "eighty")]),
            Err(ReviewerError::Config(_))
        ));
        assert!(load(&[("REVIEWER_PORT", "70000")]).is_err());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = load(&[("LLM_BACKEND", "palm")]).unwrap_err();
        assert!(err.to_string().contains("palm"));
    }
}
