//! REST API endpoint handlers for the Observer server.
//!
//! All handlers act on the shared [`SessionHandle`](debunk_core::SessionHandle)
//! held in [`AppState`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/state` | Level, totals, phase |
//! | `GET` | `/api/history` | Submission history (`?order=oldest\|recent`) |
//! | `GET` | `/api/posts` | Active posts with stage and remaining time |
//! | `GET` | `/api/presentation` | BGM, danger, colour, and glow bands |
//! | `GET` | `/api/snapshot` | Everything above in one payload |
//! | `POST` | `/api/session/start` | Leave the start screen |
//! | `POST` | `/api/session/submit` | Submit a message for scoring |
//! | `POST` | `/api/session/reset` | Start over under a new session id |
//! | `POST` | `/api/posts/{id}/dismiss` | Remove a post before absorption |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use debunk_core::SubmitOutcome;
use debunk_types::{PostId, SubmissionRecord};
use serde::Deserialize;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/history` endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// `oldest` (submission order, default) or `recent` (newest first).
    pub order: Option<String>,
}

/// Body of `POST /api/session/submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// The player's message.
    pub text: String,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the session and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.session.snapshot().await;
    let level = snapshot.state.conspiracy_level;
    let phase = format!("{:?}", snapshot.state.phase);
    let theme = snapshot.theme;
    let posts = snapshot.posts.len();
    let submissions = snapshot.history.len();
    let bgm = format!("{:?}", snapshot.presentation.bgm);
    let started_at = state.started_at.format("%Y-%m-%d %H:%M:%S UTC");

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Debunk Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #f78166; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #f78166; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Debunk Observer</h1>
    <p class="subtitle">Theme: {theme} -- up since {started_at}</p>

    <div>
        <div class="metric"><div class="label">Conspiracy</div><div class="value">{level}/50</div></div>
        <div class="metric"><div class="label">Phase</div><div class="value">{phase}</div></div>
        <div class="metric"><div class="label">Posts</div><div class="value">{posts}</div></div>
        <div class="metric"><div class="label">Submissions</div><div class="value">{submissions}</div></div>
        <div class="metric"><div class="label">BGM</div><div class="value">{bgm}</div></div>
    </div>

    <h2>API</h2>
    <ul>
        <li>GET <a href="/api/state">/api/state</a></li>
        <li>GET <a href="/api/history?order=recent">/api/history</a></li>
        <li>GET <a href="/api/posts">/api/posts</a></li>
        <li>GET <a href="/api/presentation">/api/presentation</a></li>
        <li>GET <a href="/api/snapshot">/api/snapshot</a></li>
        <li>POST /api/session/start</li>
        <li>POST /api/session/submit</li>
        <li>POST /api/session/reset</li>
        <li>POST /api/posts/{{id}}/dismiss</li>
        <li>WS /ws/events</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Current level, totals, and phase.
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.read(debunk_core::GameSession::state).await)
}

/// Submission history.
///
/// # Query Parameters
///
/// - `order`: `oldest` (default) | `recent`
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let recent = match params.order.as_deref() {
        None | Some("oldest") => false,
        Some("recent") => true,
        Some(other) => {
            return Err(ObserverError::InvalidQuery(format!(
                "order must be `oldest` or `recent`, got `{other}`"
            )));
        }
    };

    let history: Vec<SubmissionRecord> = state
        .session
        .read(|session| {
            if recent {
                session.log().recent().cloned().collect()
            } else {
                session.log().history().to_vec()
            }
        })
        .await;

    Ok(Json(serde_json::json!({
        "count": history.len(),
        "history": history,
    })))
}

/// Active posts with stage and remaining lifetime.
pub async fn get_posts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let posts = state.session.snapshot().await.posts;
    Json(serde_json::json!({
        "count": posts.len(),
        "posts": posts,
    }))
}

/// Current presentation tier.
pub async fn get_presentation(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.read(debunk_core::GameSession::presentation).await)
}

/// Full session snapshot.
pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.snapshot().await)
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// Leave the start screen. Starting twice is a no-op (`started: false`).
pub async fn start_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let started = state.session.start().await;
    let game = state.session.read(debunk_core::GameSession::state).await;
    Json(serde_json::json!({
        "started": started,
        "state": game,
    }))
}

/// Submit a message for scoring.
///
/// Rejections (blank text, a submission already in flight, not playing)
/// answer `200` with `accepted: false` and a reason; they are no-ops, not
/// errors.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let outcome = state.session.submit(&request.text).await;
    let game = serde_json::to_value(state.session.read(debunk_core::GameSession::state).await)?;

    let body = match outcome {
        Err(rejection) => serde_json::json!({
            "accepted": false,
            "reason": rejection.to_string(),
            "state": game,
        }),
        Ok(SubmitOutcome::Scored { result, .. }) => serde_json::json!({
            "accepted": true,
            "outcome": "scored",
            "result": result,
            "state": game,
        }),
        Ok(SubmitOutcome::Overridden { .. }) => serde_json::json!({
            "accepted": true,
            "outcome": "overridden",
            "state": game,
        }),
        Ok(SubmitOutcome::Discarded) => serde_json::json!({
            "accepted": true,
            "outcome": "discarded",
            "state": game,
        }),
    };
    Ok(Json(body))
}

/// Throw the session away and return to the start screen.
pub async fn reset_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.reset().await;
    Json(state.session.read(debunk_core::GameSession::state).await)
}

/// Remove an active post before it is absorbed.
pub async fn dismiss_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ObserverError> {
    let post_id = PostId(id);
    if state.session.dismiss(post_id).await {
        Ok(Json(serde_json::json!({ "dismissed": post_id })))
    } else {
        Err(ObserverError::NotFound(format!("post {post_id} is not active")))
    }
}
