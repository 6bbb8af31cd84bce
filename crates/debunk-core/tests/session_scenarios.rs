//! End-to-end session scenarios through [`SessionHandle`].
//!
//! Time is paused (`tokio::time::pause`) so spawn and absorb deadlines are
//! reached deterministically.

#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::missing_panics_doc
)]

use std::sync::Arc;
use std::time::Duration;

use debunk_core::catalogue::PostCatalogue;
use debunk_core::config::GameConfig;
use debunk_core::{Evaluator, GameSession, ScriptedEvaluator, SessionHandle, SubmitOutcome};
use debunk_types::{EvaluationResult, GameEvent, Phase};
use futures::future::BoxFuture;
use tokio::sync::Notify;

const CATALOGUE: &str = r##"{
    "flat_earth": [
        {"account_name": "Horizon Truth", "account_id": "@flat_horizon",
         "text_content": "Ever seen the curve yourself?", "hash_tags": ["#flatearth"]},
        {"account_name": "Globe Skeptic", "account_id": "@no_globe",
         "text_content": "Water always finds its level.", "hash_tags": []}
    ]
}"##;

fn config() -> GameConfig {
    let mut config = GameConfig::default();
    config.game.seed = Some(2024);
    config
}

fn handle_with(config: &GameConfig, evaluator: Arc<dyn Evaluator>) -> Arc<SessionHandle> {
    let catalogue = Arc::new(PostCatalogue::from_json(CATALOGUE).unwrap());
    let session = GameSession::new(config, catalogue).unwrap();
    Arc::new(SessionHandle::new(session, evaluator))
}

/// Holds every evaluation until released.
struct GatedEvaluator {
    gate: Notify,
    result: EvaluationResult,
}

impl Evaluator for GatedEvaluator {
    fn evaluate<'a>(&'a self, _theme: &'a str, _text: &'a str) -> BoxFuture<'a, EvaluationResult> {
        Box::pin(async move {
            self.gate.notified().await;
            self.result
        })
    }
}

#[tokio::test]
async fn persuasion_drives_level_to_win() {
    let evaluator = Arc::new(ScriptedEvaluator::new([
        EvaluationResult::new(5, 5),
        EvaluationResult::new(3, 4),
        EvaluationResult::new(2, 2),
    ]));
    let handle = handle_with(&config(), evaluator);
    handle.start().await;

    assert!(matches!(
        handle.submit("ships disappear hull first").await,
        Ok(SubmitOutcome::Scored { level: 10, .. })
    ));
    assert!(matches!(
        handle.submit("you can watch it yourself at the beach").await,
        Ok(SubmitOutcome::Scored { level: 3, .. })
    ));
    assert!(matches!(
        handle.submit("I get why it feels that way").await,
        Ok(SubmitOutcome::Scored { level: 0, .. })
    ));

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.state.phase, Phase::Win);
    assert_eq!(snapshot.state.total_persuasive, 10);
    assert_eq!(snapshot.state.total_empathy, 11);
    assert_eq!(snapshot.history.len(), 3);
    assert!(snapshot.posts.is_empty());
}

#[tokio::test(start_paused = true)]
async fn absorptions_drive_level_to_game_over() {
    let mut config = config();
    config.posts.increase_min = 9;
    config.posts.increase_max = 9;
    let handle = handle_with(&config, Arc::new(ScriptedEvaluator::zero()));
    let mut rx = handle.subscribe();
    handle.start().await;

    // Absorptions at 7000, 10000, 13000 take the level to 47.
    tokio::time::advance(Duration::from_millis(13_000)).await;
    handle.tick().await;
    assert_eq!(handle.read(GameSession::level).await, 47);
    assert_eq!(handle.read(GameSession::phase).await, Phase::Playing);

    tokio::time::advance(Duration::from_millis(3_000)).await;
    handle.tick().await;
    assert_eq!(handle.read(GameSession::level).await, 50);
    assert_eq!(handle.read(GameSession::phase).await, Phase::GameOver);

    let mut saw_game_over = false;
    while let Ok(event) = rx.try_recv() {
        if let GameEvent::PhaseChanged { to, .. } = event {
            saw_game_over |= to == Phase::GameOver;
        }
    }
    assert!(saw_game_over);

    // Frozen: no more spawns, no more input.
    tokio::time::advance(Duration::from_millis(30_000)).await;
    handle.tick().await;
    assert!(handle.snapshot().await.posts.is_empty());
    assert!(handle.submit("please").await.is_err());
}

#[tokio::test]
async fn evaluation_failure_then_success() {
    let evaluator = Arc::new(ScriptedEvaluator::new([
        EvaluationResult::ZERO,
        EvaluationResult::new(2, 1),
    ]));
    let handle = handle_with(&config(), evaluator);
    handle.start().await;

    let first = handle.submit("first try").await.unwrap();
    assert_eq!(
        first,
        SubmitOutcome::Scored {
            result: EvaluationResult::ZERO,
            level: 20,
        }
    );
    let state = handle.snapshot().await.state;
    assert_eq!((state.total_persuasive, state.total_empathy), (0, 0));

    let second = handle.submit("second try").await.unwrap();
    assert_eq!(
        second,
        SubmitOutcome::Scored {
            result: EvaluationResult::new(2, 1),
            level: 17,
        }
    );
}

#[tokio::test]
async fn result_arriving_after_reset_is_discarded() {
    let evaluator = Arc::new(GatedEvaluator {
        gate: Notify::new(),
        result: EvaluationResult::new(5, 5),
    });
    let handle = handle_with(&config(), Arc::clone(&evaluator) as Arc<dyn Evaluator>);
    handle.start().await;

    let pending = tokio::spawn({
        let handle = Arc::clone(&handle);
        async move { handle.submit("long argument").await }
    });

    while !handle.read(GameSession::submission_in_flight).await {
        tokio::task::yield_now().await;
    }
    assert!(handle.submit("impatient").await.is_err());

    handle.reset().await;
    handle.start().await;
    evaluator.gate.notify_one();

    let outcome = pending.await.unwrap().unwrap();
    assert_eq!(outcome, SubmitOutcome::Discarded);

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.state.conspiracy_level, 20);
    assert!(snapshot.history.is_empty());
    assert!(!snapshot.submission_in_flight);
}

#[tokio::test]
async fn sentinel_skips_the_evaluator() {
    let evaluator = Arc::new(ScriptedEvaluator::new([EvaluationResult::new(1, 1)]));
    let handle = handle_with(&config(), Arc::clone(&evaluator) as Arc<dyn Evaluator>);
    handle.start().await;

    assert_eq!(
        handle.submit("9歳").await,
        Ok(SubmitOutcome::Overridden { level: 0 })
    );
    assert_eq!(evaluator.calls(), 0);

    let state = handle.snapshot().await.state;
    assert_eq!(state.phase, Phase::Win);
    assert_eq!((state.total_persuasive, state.total_empathy), (0, 0));
}

#[tokio::test(start_paused = true)]
async fn reset_leaves_no_pending_absorptions() {
    let handle = handle_with(&config(), Arc::new(ScriptedEvaluator::zero()));
    handle.start().await;
    tokio::time::advance(Duration::from_millis(6_000)).await;
    handle.tick().await;
    assert_eq!(handle.snapshot().await.posts.len(), 2);

    handle.reset().await;
    tokio::time::advance(Duration::from_millis(60_000)).await;
    handle.tick().await;

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.state.phase, Phase::Start);
    assert_eq!(snapshot.state.conspiracy_level, 20);
    assert!(snapshot.posts.is_empty());
}
