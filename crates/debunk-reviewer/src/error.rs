//! Error types for the scoring service.
//!
//! None of these reach the client: every failure while scoring a request
//! collapses into a zero score. They exist so the cause can be logged.

/// Errors that can occur while scoring a request.
#[derive(Debug, thiserror::Error)]
pub enum ReviewerError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// The request body is not a usable `{theme, input}` payload.
    #[error("bad request: {0}")]
    Request(String),

    /// Failed to load or render a prompt template.
    #[error("template error: {0}")]
    Template(String),

    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// The LLM reply did not contain a usable score pair.
    #[error("no score in LLM reply: {0}")]
    NoScore(String),
}
