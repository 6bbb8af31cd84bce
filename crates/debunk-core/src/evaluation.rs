//! Evaluator trait and scripted implementation.
//!
//! A session scores each player submission through an [`Evaluator`]. The
//! trait abstracts where scores come from: the HTTP scoring service in
//! production, a [`ScriptedEvaluator`] in tests and offline play.
//!
//! Evaluation is infallible from the caller's point of view. An
//! implementation that cannot produce a score returns
//! [`EvaluationResult::ZERO`], which leaves the level untouched.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use debunk_types::EvaluationResult;
use futures::future::BoxFuture;

/// A source of submission scores.
pub trait Evaluator: Send + Sync {
    /// Score `text` against `theme`.
    ///
    /// Must not fail: any internal problem is reported as
    /// [`EvaluationResult::ZERO`].
    fn evaluate<'a>(&'a self, theme: &'a str, text: &'a str) -> BoxFuture<'a, EvaluationResult>;
}

/// Replays a fixed queue of results, then answers zero.
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    queue: Mutex<VecDeque<EvaluationResult>>,
    calls: AtomicUsize,
}

impl ScriptedEvaluator {
    /// Evaluator that replays `results` in order.
    pub fn new(results: impl IntoIterator<Item = EvaluationResult>) -> Self {
        Self {
            queue: Mutex::new(results.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Evaluator that always answers zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Append a result to the queue.
    pub fn push(&self, result: EvaluationResult) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(result);
        }
    }

    /// Number of times [`Evaluator::evaluate`] was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn next(&self) -> EvaluationResult {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.queue
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(EvaluationResult::ZERO)
    }
}

impl Evaluator for ScriptedEvaluator {
    fn evaluate<'a>(&'a self, _theme: &'a str, _text: &'a str) -> BoxFuture<'a, EvaluationResult> {
        let result = self.next();
        Box::pin(async move { result })
    }
}
