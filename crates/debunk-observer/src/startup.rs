//! Observer server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] binds eagerly, so a port conflict is reported to the
//! caller before anything else starts, then serves on a background task.

use std::net::SocketAddr;
use std::sync::Arc;

use debunk_core::config::ServerConfig;
use tokio::task::JoinHandle;

use crate::server::{self, ServerError};
use crate::state::AppState;

/// Bind the configured address and serve the Observer API on a background
/// Tokio task.
///
/// Returns the bound address (useful when `port` is 0) and the task
/// handle, which the caller aborts or awaits on shutdown.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or in use.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok((addr, handle))
}
