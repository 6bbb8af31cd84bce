//! Scoring service for Debunk.
//!
//! Receives `{theme, input}` from the game engine, asks an LLM to rate the
//! message for persuasiveness and empathy, and answers with the pair.
//!
//! # Architecture
//!
//! ```text
//! POST / --> parse body --> Prompt Engine --> LLM Backend --> extract scores --> 200 JSON
//! ```
//!
//! Every request gets an answer. If any step fails the reply is
//! `{"persuasive": 0, "empathy": 0}`.

mod config;
mod error;
mod llm;
mod parse;
mod prompt;
mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ReviewerConfig;
use crate::llm::create_backend;
use crate::prompt::PromptEngine;
use crate::server::ReviewerState;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// compiles prompt templates, sets up the LLM backend, then serves until
/// Ctrl-C.
///
/// # Errors
///
/// Returns an error if configuration, templates, or binding the port fail.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("debunk-reviewer starting");

    // Load configuration from environment
    let config = ReviewerConfig::from_env()?;
    info!(
        port = config.port,
        api_url = config.backend.api_url,
        templates_dir = config.templates_dir.as_deref().unwrap_or("<built-in>"),
        "configuration loaded"
    );

    // Compile prompt templates
    let prompts = PromptEngine::new(config.templates_dir.as_deref())?;

    // Create LLM backend
    let backend = create_backend(&config.backend);
    info!(
        backend = backend.name(),
        model = backend.model(),
        "LLM backend configured"
    );

    let state = Arc::new(ReviewerState { backend, prompts });
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "scoring service listening");

    axum::serve(listener, server::build_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
        })
        .await?;

    info!("debunk-reviewer shutdown complete");
    Ok(())
}
