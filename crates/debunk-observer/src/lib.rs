//! Observer API server for the Debunk game.
//!
//! This crate is the surface the rendering and audio layer talks to. It
//! provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/events`) streaming every
//!   [`GameEvent`](debunk_types::GameEvent) as JSON
//! - **REST endpoints** for reading the session (state, history, posts,
//!   presentation tier, full snapshot)
//! - **Session controls** (start, submit, reset, dismiss a post)
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Every handler goes through the shared
//! [`SessionHandle`](debunk_core::SessionHandle), which serializes
//! mutations. `WebSocket` clients subscribe to the handle's broadcast
//! channel with automatic lag handling.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::spawn_observer;
pub use state::AppState;
