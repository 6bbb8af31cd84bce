//! Error types for the evaluation client.
//!
//! These never reach the game: [`HttpEvaluator`](crate::HttpEvaluator)
//! logs them and answers with the zero result instead.

/// Ways a scoring request can fail.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    /// The request could not be sent, timed out, or the body was unreadable.
    #[error("scoring request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("scoring service returned {0}")]
    Status(reqwest::StatusCode),

    /// The body was not JSON.
    #[error("scoring response is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A score field was missing or not a number.
    #[error("scoring response field `{0}` missing or not numeric")]
    Field(&'static str),
}
