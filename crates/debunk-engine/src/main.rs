//! Game engine binary for Debunk.
//!
//! Wires the post catalogue, the HTTP evaluator, the game session, and the
//! Observer API together, then drives the session ticker until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `debunk-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the post catalogue
//! 4. Create the HTTP evaluator
//! 5. Create the game session and its handle
//! 6. Start the Observer API server
//! 7. Run the ticker until shutdown
//! 8. Log the result

mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use debunk_core::catalogue::PostCatalogue;
use debunk_core::config::GameConfig;
use debunk_core::{GameSession, SessionHandle, runner};
use debunk_evaluator::HttpEvaluator;
use debunk_observer::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const CONFIG_PATH: &str = "debunk-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, catalogue, evaluator, or observer
/// initialization fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet; the outcome is logged below.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("debunk-engine starting");
    if from_file {
        info!(path = CONFIG_PATH, "Configuration loaded");
    } else {
        info!("Config file not found, using defaults");
    }
    info!(
        theme = config.game.theme,
        evaluator_url = config.evaluator.url,
        spawn_interval_ms = config.posts.spawn_interval_ms,
        absorb_delay_ms = config.posts.absorb_delay_ms,
        tick_interval_ms = config.ticker.tick_interval_ms,
        "Game configuration"
    );
    if config.game.sentinel.is_some() {
        warn!("Sentinel phrase is enabled; a matching submission wins outright");
    }

    // 3. Load the post catalogue.
    let catalogue = PostCatalogue::from_file(Path::new(&config.catalogue.path))
        .map(Arc::new)
        .map_err(EngineError::from)?;
    info!(
        path = config.catalogue.path,
        themes = catalogue.themes().count(),
        "Post catalogue loaded"
    );

    // 4. Create the HTTP evaluator.
    let evaluator = HttpEvaluator::new(&config.evaluator)
        .map_err(EngineError::from)?;
    info!(
        url = evaluator.url(),
        timeout_ms = config.evaluator.timeout_ms,
        "HTTP evaluator ready"
    );

    // 5. Create the game session. Fails if the theme has no posts.
    let session = GameSession::new(&config, catalogue).map_err(EngineError::from)?;
    info!(session_id = %session.id(), theme = session.theme(), "Game session created");
    let handle = Arc::new(SessionHandle::new(session, Arc::new(evaluator)));

    // 6. Start Observer API server.
    let app_state = Arc::new(AppState::new(Arc::clone(&handle)));
    let (addr, observer) = debunk_observer::spawn_observer(&config.server, app_state)
        .await
        .map_err(EngineError::from)?;
    info!(%addr, "Observer API server started");

    // 7. Run the ticker until Ctrl-C.
    let period = Duration::from_millis(config.ticker.tick_interval_ms);
    let summary = runner::run_ticker(handle, period, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C, shutting down");
        }
    })
    .await;

    // 8. Log results.
    observer.abort();
    info!(ticks = summary.ticks, "debunk-engine shutdown complete");

    Ok(())
}

/// Load the game configuration from `debunk-config.yaml`.
///
/// Looks for the file relative to the current working directory. Without
/// one, defaults apply (environment overrides still take effect). The flag
/// reports whether the file was found.
fn load_config() -> Result<(GameConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((GameConfig::from_file(config_path)?, true))
    } else {
        Ok((GameConfig::parse("")?, false))
    }
}
