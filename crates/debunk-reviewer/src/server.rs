//! HTTP surface of the scoring service.
//!
//! One route, `POST /`. It always answers `200` with a score pair: any
//! failure along the way (bad body, template, backend, unparseable reply)
//! is logged and answered with zeros.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::error::ReviewerError;
use crate::llm::LlmBackend;
use crate::parse::{self, Scores};
use crate::prompt::PromptEngine;

/// Shared state for the scoring handler.
#[derive(Debug)]
pub struct ReviewerState {
    /// Backend the prompts are sent to.
    pub backend: LlmBackend,
    /// Compiled prompt templates.
    pub prompts: PromptEngine,
}

/// Build the service router.
pub fn build_router(state: Arc<ReviewerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(review))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Score one message.
async fn review(State(state): State<Arc<ReviewerState>>, body: Bytes) -> Json<Scores> {
    match score(&state, &body).await {
        Ok(scores) => {
            info!(
                persuasive = scores.persuasive,
                empathy = scores.empathy,
                "message scored"
            );
            Json(scores)
        }
        Err(e) => {
            warn!(error = %e, "scoring failed, answering zero");
            Json(Scores::ZERO)
        }
    }
}

async fn score(state: &ReviewerState, body: &[u8]) -> Result<Scores, ReviewerError> {
    let body = std::str::from_utf8(body)
        .map_err(|e| ReviewerError::Request(format!("body is not UTF-8: {e}")))?;
    let request = parse::parse_request(body)?;
    let prompt = state.prompts.render(&request.theme, &request.input)?;

    let reply = state.backend.complete(&prompt).await?;
    debug!(theme = request.theme, reply = reply.trim(), "LLM reply");

    parse::extract_scores(&reply).ok_or(ReviewerError::NoScore(reply))
}
