//! Shared, async-safe access to a [`GameSession`].
//!
//! [`SessionHandle`] serializes every mutation through a
//! [`tokio::sync::Mutex`], owns the [`Evaluator`], and fans session events
//! out on a [`broadcast`] channel. The session clock is the time elapsed
//! since the handle was created.

use std::sync::Arc;

use debunk_types::{EvaluationResult, GameEvent, PostId, SessionId, SessionSnapshot};
use tokio::sync::{Mutex, broadcast};
use tokio::time::Instant;
use tracing::debug;

use crate::evaluation::Evaluator;
use crate::session::{
    GameSession, SubmissionCompletion, SubmissionStart, SubmitRejection,
};

/// Capacity of the event broadcast channel.
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Result of an accepted [`SessionHandle::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The sentinel was submitted; the level was set without evaluation.
    Overridden {
        /// Level after the override.
        level: u32,
    },
    /// The submission was evaluated and applied.
    Scored {
        /// Scores returned by the evaluator.
        result: EvaluationResult,
        /// Level after the delta.
        level: u32,
    },
    /// The session was reset or ended while the evaluation was running.
    Discarded,
}

/// Async front of a [`GameSession`].
pub struct SessionHandle {
    session: Arc<Mutex<GameSession>>,
    evaluator: Arc<dyn Evaluator>,
    events: broadcast::Sender<GameEvent>,
    epoch: Instant,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("epoch", &self.epoch)
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    /// Wrap a session and its evaluator.
    pub fn new(session: GameSession, evaluator: Arc<dyn Evaluator>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session: Arc::new(Mutex::new(session)),
            evaluator,
            events,
            epoch: Instant::now(),
        }
    }

    /// Milliseconds since the handle was created.
    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Start the session. Returns `false` if it was not in `Start`.
    pub async fn start(&self) -> bool {
        let now_ms = self.now_ms();
        let mut session = self.session.lock().await;
        let started = session.start(now_ms);
        self.publish(&mut session);
        started
    }

    /// Reset the session under a new id.
    pub async fn reset(&self) {
        let mut session = self.session.lock().await;
        session.reset();
        self.publish(&mut session);
    }

    /// Advance the scheduler to the current session time.
    pub async fn tick(&self) {
        let now_ms = self.now_ms();
        let mut session = self.session.lock().await;
        session.advance(now_ms);
        self.publish(&mut session);
    }

    /// Dismiss an active post. Returns whether it was active.
    pub async fn dismiss(&self, post_id: PostId) -> bool {
        let mut session = self.session.lock().await;
        let removed = session.dismiss(post_id);
        self.publish(&mut session);
        removed
    }

    /// Snapshot at the current session time.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let now_ms = self.now_ms();
        self.session.lock().await.snapshot(now_ms)
    }

    /// Run `f` against the locked session without mutating it.
    pub async fn read<T>(&self, f: impl FnOnce(&GameSession) -> T) -> T {
        let session = self.session.lock().await;
        f(&session)
    }

    /// Submit text for scoring.
    ///
    /// The session lock is released while the evaluator runs, so ticks and
    /// resets proceed during evaluation. A reset in that window makes the
    /// result stale and it is discarded. Dropping the returned future before
    /// it resolves abandons the evaluation and frees the submission slot.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitRejection`] if the submission is not accepted.
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome, SubmitRejection> {
        let ticket = {
            let mut session = self.session.lock().await;
            let start = session.begin_submission(text)?;
            self.publish(&mut session);
            match start {
                SubmissionStart::Overridden { level } => {
                    return Ok(SubmitOutcome::Overridden { level });
                }
                SubmissionStart::Pending(ticket) => ticket,
            }
        };

        let mut pending = PendingSubmission::new(Arc::clone(&self.session), ticket.session_id);
        let result = self.evaluator.evaluate(&ticket.theme, &ticket.text).await;

        let mut session = self.session.lock().await;
        pending.disarm();
        let completion = session.complete_submission(&ticket, result);
        self.publish(&mut session);
        Ok(match completion {
            SubmissionCompletion::Scored { level, .. } => SubmitOutcome::Scored { result, level },
            SubmissionCompletion::Discarded => SubmitOutcome::Discarded,
        })
    }

    fn publish(&self, session: &mut GameSession) {
        for event in session.drain_events() {
            debug!(kind = event.kind(), "Publishing session event");
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }
}

/// Clears the in-flight flag if a submission is dropped before completing.
struct PendingSubmission {
    session: Arc<Mutex<GameSession>>,
    session_id: Option<SessionId>,
}

impl PendingSubmission {
    const fn new(session: Arc<Mutex<GameSession>>, session_id: SessionId) -> Self {
        Self {
            session,
            session_id: Some(session_id),
        }
    }

    const fn disarm(&mut self) {
        self.session_id = None;
    }
}

impl Drop for PendingSubmission {
    fn drop(&mut self) {
        let Some(session_id) = self.session_id.take() else {
            return;
        };
        if let Ok(mut session) = self.session.try_lock() {
            session.abandon_submission(session_id);
            return;
        }
        // Lock is busy: finish the release on the runtime.
        let session = Arc::clone(&self.session);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                session.lock().await.abandon_submission(session_id);
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use debunk_types::Phase;
    use futures::future::BoxFuture;

    use super::*;
    use crate::catalogue::PostCatalogue;
    use crate::config::GameConfig;
    use crate::evaluation::ScriptedEvaluator;

    /// Never answers.
    struct StalledEvaluator;

    impl Evaluator for StalledEvaluator {
        fn evaluate<'a>(&'a self, _theme: &'a str, _text: &'a str) -> BoxFuture<'a, EvaluationResult> {
            Box::pin(futures::future::pending())
        }
    }

    fn handle(results: Vec<EvaluationResult>) -> SessionHandle {
        handle_with(Arc::new(ScriptedEvaluator::new(results)))
    }

    fn handle_with(evaluator: Arc<dyn Evaluator>) -> SessionHandle {
        let catalogue = PostCatalogue::from_json(
            r#"{"flat_earth": [{"account_name": "A", "account_id": "@a", "text_content": "t"}]}"#,
        )
        .unwrap();
        let mut config = GameConfig::default();
        config.game.seed = Some(5);
        let session = GameSession::new(&config, Arc::new(catalogue)).unwrap();
        SessionHandle::new(session, evaluator)
    }

    #[tokio::test]
    async fn submit_scores_and_broadcasts() {
        let handle = handle(vec![EvaluationResult::new(3, 1)]);
        let mut rx = handle.subscribe();
        assert!(handle.start().await);

        let outcome = handle.submit("look at the horizon from a plane").await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Scored {
                result: EvaluationResult::new(3, 1),
                level: 16,
            }
        );

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(event.kind());
        }
        assert_eq!(
            kinds,
            [
                "started",
                "phase_changed",
                "scored",
                "level_changed",
                "presentation_changed"
            ]
        );
    }

    #[tokio::test]
    async fn rejected_submission_changes_nothing() {
        let handle = handle(Vec::new());
        assert_eq!(
            handle.submit("too early").await,
            Err(SubmitRejection::NotPlaying(Phase::Start))
        );
        handle.start().await;
        assert_eq!(handle.submit("  ").await, Err(SubmitRejection::Blank));
        let snapshot = handle.snapshot().await;
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.state.conspiracy_level, 20);
    }

    #[tokio::test]
    async fn sentinel_through_handle() {
        let handle = handle(Vec::new());
        handle.start().await;
        assert_eq!(
            handle.submit("9歳").await,
            Ok(SubmitOutcome::Overridden { level: 0 })
        );
        assert_eq!(handle.read(GameSession::phase).await, Phase::Win);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_follows_session_clock() {
        let handle = handle(Vec::new());
        handle.start().await;

        tokio::time::advance(std::time::Duration::from_millis(3_000)).await;
        handle.tick().await;
        assert_eq!(handle.read(|s| s.scheduler().len()).await, 1);

        assert!(handle.dismiss(PostId(0)).await);
        assert!(!handle.dismiss(PostId(0)).await);
        assert_eq!(handle.snapshot().await.posts.len(), 0);
    }

    #[tokio::test]
    async fn dropped_submit_frees_the_slot() {
        let handle = handle_with(Arc::new(StalledEvaluator));
        handle.start().await;

        let first = tokio::time::timeout(Duration::from_millis(10), handle.submit("hello")).await;
        assert!(first.is_err(), "stalled evaluation should time out");
        assert!(!handle.read(GameSession::submission_in_flight).await);

        // Accepted again: it reaches the evaluator and stalls, rather than
        // being rejected as in flight.
        let second = tokio::time::timeout(Duration::from_millis(10), handle.submit("again")).await;
        assert!(second.is_err());
        assert!(!handle.read(GameSession::submission_in_flight).await);
        assert_eq!(handle.read(GameSession::level).await, 20);
    }

    #[tokio::test]
    async fn dropped_stale_submit_keeps_new_session_slot() {
        let handle = Arc::new(handle_with(Arc::new(StalledEvaluator)));
        handle.start().await;

        let spawn_submit = |text: &'static str| {
            let handle = Arc::clone(&handle);
            tokio::spawn(async move { handle.submit(text).await })
        };
        let old = spawn_submit("old session");
        while !handle.read(GameSession::submission_in_flight).await {
            tokio::task::yield_now().await;
        }

        handle.reset().await;
        handle.start().await;
        let current = spawn_submit("new session");
        while !handle.read(GameSession::submission_in_flight).await {
            tokio::task::yield_now().await;
        }

        old.abort();
        assert!(old.await.unwrap_err().is_cancelled());
        assert!(handle.read(GameSession::submission_in_flight).await);

        current.abort();
        assert!(current.await.unwrap_err().is_cancelled());
        assert!(!handle.read(GameSession::submission_in_flight).await);
    }
}
