//! Shared application state for the Observer API server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use debunk_core::SessionHandle;
use debunk_types::GameEvent;
use tokio::sync::broadcast;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The game session every request acts on.
    pub session: Arc<SessionHandle>,
    /// When the observer was created.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Serve `session`.
    pub fn new(session: Arc<SessionHandle>) -> Self {
        Self {
            session,
            started_at: Utc::now(),
        }
    }

    /// Subscribe to session events.
    ///
    /// A receiver that falls more than
    /// [`EVENT_CHANNEL_CAPACITY`](debunk_core::handle::EVENT_CHANNEL_CAPACITY)
    /// events behind gets `Lagged` and skips ahead.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.session.subscribe()
    }
}
