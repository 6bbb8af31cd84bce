//! Live event feed for renderers.
//!
//! `GET /ws/events` pushes each [`GameEvent`] the session emits as one JSON
//! text frame. Every renderer subscribes to the same broadcast channel.
//!
//! A renderer that cannot keep up loses the oldest events and carries on
//! from the newest; `/api/snapshot` gives it the full picture again.

use std::ops::ControlFlow;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use debunk_types::GameEvent;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// `GET /ws/events`
pub async fn ws_events(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_events(socket, state))
}

/// Forward session events to one renderer until either side goes away.
async fn stream_events(mut socket: WebSocket, state: Arc<AppState>) {
    let mut events = state.subscribe();
    debug!("Renderer subscribed to event feed");

    loop {
        let flow = tokio::select! {
            received = events.recv() => match received {
                Ok(event) => push_event(&mut socket, &event).await,
                Err(RecvError::Lagged(missed)) => {
                    debug!(missed, "Renderer fell behind the event feed");
                    ControlFlow::Continue(())
                }
                Err(RecvError::Closed) => {
                    debug!("Event feed closed");
                    ControlFlow::Break(())
                }
            },
            frame = socket.recv() => answer_frame(&mut socket, frame).await,
        };
        if flow.is_break() {
            debug!("Renderer left event feed");
            return;
        }
    }
}

async fn push_event(socket: &mut WebSocket, event: &GameEvent) -> ControlFlow<()> {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!(kind = event.kind(), error = %e, "Event not serializable, skipped");
            return ControlFlow::Continue(());
        }
    };
    if socket.send(Message::Text(json.into())).await.is_err() {
        return ControlFlow::Break(());
    }
    ControlFlow::Continue(())
}

/// Renderers only listen; anything but ping and close is ignored.
async fn answer_frame(
    socket: &mut WebSocket,
    frame: Option<Result<Message, axum::Error>>,
) -> ControlFlow<()> {
    match frame {
        None | Some(Ok(Message::Close(_))) => ControlFlow::Break(()),
        Some(Err(e)) => {
            debug!(error = %e, "Renderer socket error");
            ControlFlow::Break(())
        }
        Some(Ok(Message::Ping(payload))) => {
            if socket.send(Message::Pong(payload)).await.is_err() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
        Some(Ok(_)) => ControlFlow::Continue(()),
    }
}
