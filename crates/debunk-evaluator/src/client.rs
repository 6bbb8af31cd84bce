//! `reqwest`-backed [`Evaluator`].

use std::time::Duration;

use debunk_core::Evaluator;
use debunk_core::config::EvaluatorConfig;
use debunk_types::EvaluationResult;
use futures::future::BoxFuture;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::EvaluatorError;

/// Body POSTed to the scoring service.
#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    theme: &'a str,
    input: &'a str,
}

/// Scores submissions by calling the scoring service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEvaluator {
    client: reqwest::Client,
    url: String,
}

impl HttpEvaluator {
    /// Build a client for `config.url` with a `config.timeout_ms` deadline.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError::Transport`] if the HTTP client cannot be
    /// constructed (e.g. the TLS backend fails to initialise).
    pub fn new(config: &EvaluatorConfig) -> Result<Self, EvaluatorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Endpoint the requests go to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Score a submission, surfacing every failure.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError`] on transport failure, timeout, a
    /// non-success status, a non-JSON body, or a missing/non-numeric score.
    pub async fn try_evaluate(
        &self,
        theme: &str,
        text: &str,
    ) -> Result<EvaluationResult, EvaluatorError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ScoreRequest { theme, input: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EvaluatorError::Status(status));
        }

        let body = response.bytes().await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        parse_scores(&json)
    }
}

impl Evaluator for HttpEvaluator {
    fn evaluate<'a>(&'a self, theme: &'a str, text: &'a str) -> BoxFuture<'a, EvaluationResult> {
        Box::pin(async move {
            match self.try_evaluate(theme, text).await {
                Ok(result) => {
                    debug!(
                        persuasive = result.persuasive,
                        empathy = result.empathy,
                        "Submission evaluated"
                    );
                    result
                }
                Err(e) => {
                    warn!(url = %self.url, error = %e, "Evaluation failed, scoring zero");
                    EvaluationResult::ZERO
                }
            }
        })
    }
}

/// Read `persuasive` and `empathy` from a scoring response.
///
/// Values are rounded and clamped into `0..=5`.
///
/// # Errors
///
/// Returns [`EvaluatorError::Field`] naming the first field that is absent
/// or not a JSON number.
pub fn parse_scores(json: &serde_json::Value) -> Result<EvaluationResult, EvaluatorError> {
    let persuasive = number_field(json, "persuasive")?;
    let empathy = number_field(json, "empathy")?;
    Ok(EvaluationResult::clamped(persuasive, empathy))
}

fn number_field(json: &serde_json::Value, field: &'static str) -> Result<f64, EvaluatorError> {
    json.get(field)
        .and_then(serde_json::Value::as_f64)
        .ok_or(EvaluatorError::Field(field))
}
