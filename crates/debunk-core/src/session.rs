//! The game session aggregate.
//!
//! [`GameSession`] is the single owned object that ties together the
//! conspiracy machine, post scheduler, submission log, and presentation
//! tracker. Every mutation goes through one of its methods, and every
//! mutation leaves one or more [`GameEvent`]s in an outbox that the owner
//! drains with [`GameSession::drain_events`].
//!
//! # Submissions
//!
//! Scoring a submission is split in two so the evaluator call can happen
//! without holding the session:
//!
//! 1. [`begin_submission`](GameSession::begin_submission) validates the
//!    text, marks a submission in flight, and hands out a
//!    [`SubmissionTicket`] stamped with the current [`SessionId`].
//! 2. [`complete_submission`](GameSession::complete_submission) applies the
//!    result, unless the session was reset in between, in which case the
//!    ticket is stale and the result is dropped.

use std::sync::Arc;

use debunk_types::{
    EvaluationResult, GameEvent, GameState, Phase, PostId, PresentationTier, SessionId,
    SessionSnapshot, SubmissionRecord,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::catalogue::{CatalogueError, PostCatalogue};
use crate::config::GameConfig;
use crate::conspiracy::{ConspiracyMachine, LEVEL_START, LevelChange};
use crate::presentation::TierTracker;
use crate::scheduler::{PostScheduler, SchedulerEvent};
use crate::session_log::SessionLog;

/// Why a submission was not accepted. No state changes on rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejection {
    /// The text is empty after trimming.
    #[error("submission is blank")]
    Blank,

    /// An earlier submission is still being evaluated.
    #[error("a submission is already being evaluated")]
    InFlight,

    /// The session is not accepting input.
    #[error("session is not playing (phase: {0:?})")]
    NotPlaying(Phase),
}

/// Everything needed to evaluate one submission and report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    /// Session the submission belongs to.
    pub session_id: SessionId,
    /// Theme to evaluate against.
    pub theme: String,
    /// Trimmed submission text.
    pub text: String,
}

/// Outcome of [`GameSession::begin_submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStart {
    /// The sentinel was submitted; the level was set without evaluation.
    Overridden {
        /// Level after the override.
        level: u32,
    },
    /// The submission needs evaluating.
    Pending(SubmissionTicket),
}

/// Outcome of [`GameSession::complete_submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionCompletion {
    /// The result was recorded and applied.
    Scored {
        /// The recorded submission.
        record: SubmissionRecord,
        /// Level after the delta.
        level: u32,
    },
    /// The ticket belongs to an earlier session, or the game already ended.
    Discarded,
}

/// One play session.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    theme: String,
    sentinel: Option<String>,
    machine: ConspiracyMachine,
    log: SessionLog,
    scheduler: PostScheduler,
    tracker: TierTracker,
    catalogue: Arc<PostCatalogue>,
    in_flight: bool,
    rng: SmallRng,
    outbox: Vec<GameEvent>,
}

impl GameSession {
    /// Create a session in the `Start` phase.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if the configured theme is missing from
    /// the catalogue or lists no posts.
    pub fn new(config: &GameConfig, catalogue: Arc<PostCatalogue>) -> Result<Self, CatalogueError> {
        catalogue.ensure_playable(&config.game.theme)?;

        let rng = match config.game.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };

        Ok(Self {
            id: SessionId::new(),
            theme: config.game.theme.clone(),
            sentinel: config.game.sentinel.clone(),
            machine: ConspiracyMachine::new(),
            log: SessionLog::new(),
            scheduler: PostScheduler::new(config.posts.clone()),
            tracker: TierTracker::new(LEVEL_START),
            catalogue,
            in_flight: false,
            rng,
            outbox: Vec::new(),
        })
    }

    /// Current session id (generation token).
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Theme in play.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// Current conspiracy level.
    pub const fn level(&self) -> u32 {
        self.machine.level()
    }

    /// Submission history and totals.
    pub const fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Active posts.
    pub const fn scheduler(&self) -> &PostScheduler {
        &self.scheduler
    }

    /// Current presentation tier.
    pub const fn presentation(&self) -> PresentationTier {
        self.tracker.current()
    }

    /// Whether a submission is awaiting its evaluation.
    pub const fn submission_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Level, totals, and phase.
    pub const fn state(&self) -> GameState {
        GameState {
            session_id: self.id,
            conspiracy_level: self.machine.level(),
            total_persuasive: self.log.total_persuasive(),
            total_empathy: self.log.total_empathy(),
            phase: self.machine.phase(),
        }
    }

    /// Leave `Start` and arm the post scheduler at `now_ms`.
    ///
    /// Returns `false` (no-op) unless the phase was `Start`.
    pub fn start(&mut self, now_ms: u64) -> bool {
        let Some((from, to)) = self.machine.start() else {
            return false;
        };
        self.scheduler.arm(now_ms);

        info!(session_id = %self.id, theme = %self.theme, "Session started");
        self.outbox.push(GameEvent::Started {
            session_id: self.id,
            level: self.machine.level(),
        });
        self.outbox.push(GameEvent::PhaseChanged { from, to });
        true
    }

    /// Throw everything away and return to `Start` under a new session id.
    ///
    /// Any submission still being evaluated becomes stale.
    pub fn reset(&mut self) {
        let previous = self.id;
        self.id = SessionId::new();
        self.machine.reset();
        self.log.reset();
        self.scheduler.clear();
        self.tracker.reset(LEVEL_START);
        self.in_flight = false;

        info!(previous = %previous, session_id = %self.id, "Session reset");
        self.outbox.push(GameEvent::Reset {
            session_id: self.id,
        });
    }

    /// Run every spawn and absorption due by `now_ms`.
    pub fn advance(&mut self, now_ms: u64) {
        if !self.machine.is_playing() {
            return;
        }

        let due = self
            .scheduler
            .advance(now_ms, &self.catalogue, &self.theme, &mut self.rng);

        for event in due {
            if !self.machine.is_playing() {
                break;
            }
            match event {
                SchedulerEvent::Spawned(post) => {
                    debug!(post_id = %post.id, slot = post.vertical_slot, "Post spawned");
                    self.outbox.push(GameEvent::Spawned { post });
                }
                SchedulerEvent::Absorbed(post_id) => {
                    let increase = self.scheduler.draw_increase(&mut self.rng);
                    let delta = i32::try_from(increase).unwrap_or(i32::MAX);
                    if let Some(change) = self.machine.apply_delta(delta) {
                        debug!(%post_id, increase, level = change.current, "Post absorbed");
                        self.outbox.push(GameEvent::Absorbed {
                            post_id,
                            increase,
                            level: change.current,
                        });
                        self.settle(change);
                    }
                }
            }
        }
    }

    /// Remove an active post before it is absorbed.
    pub fn dismiss(&mut self, post_id: PostId) -> bool {
        let removed = self.scheduler.dismiss(post_id);
        if removed {
            self.outbox.push(GameEvent::Dismissed { post_id });
        }
        removed
    }

    /// Validate a submission and either apply the sentinel override or hand
    /// out a ticket for evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitRejection`] without changing any state if the session
    /// is not playing, the text is blank, or a submission is in flight.
    pub fn begin_submission(&mut self, text: &str) -> Result<SubmissionStart, SubmitRejection> {
        if !self.machine.is_playing() {
            return Err(SubmitRejection::NotPlaying(self.machine.phase()));
        }
        let raw = text;
        let text = raw.trim();
        if text.is_empty() {
            return Err(SubmitRejection::Blank);
        }
        if self.in_flight {
            return Err(SubmitRejection::InFlight);
        }

        // The sentinel must match exactly; padded input is scored as usual.
        if self.sentinel.as_deref() == Some(raw) {
            if let Some(change) = self.machine.force_level(0) {
                info!(previous = change.previous, "Sentinel submitted, level overridden");
                self.outbox.push(GameEvent::LevelOverridden {
                    previous: change.previous,
                    level: change.current,
                });
                self.settle(change);
            }
            return Ok(SubmissionStart::Overridden {
                level: self.machine.level(),
            });
        }

        self.in_flight = true;
        Ok(SubmissionStart::Pending(SubmissionTicket {
            session_id: self.id,
            theme: self.theme.clone(),
            text: text.to_owned(),
        }))
    }

    /// Give up on the in-flight submission of `session_id` without a result.
    ///
    /// Returns `false` if nothing was in flight or the ticket belongs to an
    /// earlier session.
    pub fn abandon_submission(&mut self, session_id: SessionId) -> bool {
        if session_id != self.id || !self.in_flight {
            return false;
        }
        self.in_flight = false;
        debug!(session_id = %self.id, "Submission abandoned");
        true
    }

    /// Apply an evaluation result for a ticket from
    /// [`begin_submission`](Self::begin_submission).
    pub fn complete_submission(
        &mut self,
        ticket: &SubmissionTicket,
        result: EvaluationResult,
    ) -> SubmissionCompletion {
        if ticket.session_id != self.id {
            debug!(ticket = %ticket.session_id, session_id = %self.id, "Discarding stale evaluation");
            return SubmissionCompletion::Discarded;
        }
        self.in_flight = false;
        if !self.machine.is_playing() {
            debug!(phase = ?self.machine.phase(), "Discarding evaluation after game end");
            return SubmissionCompletion::Discarded;
        }

        let delta = self.log.record(result, &ticket.text);
        let change = self.machine.apply_delta(delta);
        let level = self.machine.level();
        let record = self
            .log
            .history()
            .last()
            .cloned()
            .unwrap_or_else(|| SubmissionRecord {
                text: ticket.text.clone(),
                timestamp: chrono::Utc::now(),
                persuasive: result.persuasive,
                empathy: result.empathy,
            });

        info!(
            persuasive = result.persuasive,
            empathy = result.empathy,
            delta,
            level,
            "Submission scored"
        );
        self.outbox.push(GameEvent::Scored {
            record: record.clone(),
            delta,
            level,
        });
        if let Some(change) = change {
            self.settle(change);
        }
        SubmissionCompletion::Scored { record, level }
    }

    /// Everything a renderer needs at `now_ms`.
    pub fn snapshot(&self, now_ms: u64) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            theme: self.theme.clone(),
            history: self.log.history().to_vec(),
            posts: self.scheduler.views(now_ms),
            presentation: self.tracker.current(),
            submission_in_flight: self.in_flight,
        }
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Emit the follow-up events of a level change and stop the scheduler
    /// once the game is over.
    fn settle(&mut self, change: LevelChange) {
        if change.level_moved() {
            self.outbox.push(GameEvent::LevelChanged {
                previous: change.previous,
                current: change.current,
            });
        }
        if let Some((from, to)) = self.tracker.observe(change.current) {
            self.outbox.push(GameEvent::PresentationChanged { from, to });
        }
        if change.phase_moved() {
            info!(
                from = ?change.phase_before,
                to = ?change.phase_after,
                level = change.current,
                "Phase changed"
            );
            self.outbox.push(GameEvent::PhaseChanged {
                from: change.phase_before,
                to: change.phase_after,
            });
            if change.phase_after.is_terminal() {
                self.scheduler.clear();
            }
        }
    }
}
