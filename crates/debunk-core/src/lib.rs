//! Game simulation engine for the Debunk persuasion game.
//!
//! This crate owns everything that moves the conspiracy level: the state
//! machine, the post lifecycle scheduler, the scoring rule, and the
//! presentation bands derived from the level.
//!
//! # Modules
//!
//! - [`conspiracy`] -- Level and phase state machine.
//! - [`catalogue`] -- Theme-keyed post templates loaded from JSON.
//! - [`scheduler`] -- Arena of active posts with absolute due times.
//! - [`session_log`] -- Submission history and running totals.
//! - [`presentation`] -- Level to BGM, danger, colour, and glow bands.
//! - [`evaluation`] -- [`Evaluator`] trait and [`ScriptedEvaluator`].
//! - [`session`] -- [`GameSession`], the single owned session object.
//! - [`handle`] -- [`SessionHandle`], async access plus event broadcast.
//! - [`runner`] -- Fixed-interval tick loop.
//! - [`config`] -- Configuration loading from `debunk-config.yaml`.
//!
//! [`Evaluator`]: evaluation::Evaluator
//! [`ScriptedEvaluator`]: evaluation::ScriptedEvaluator
//! [`GameSession`]: session::GameSession
//! [`SessionHandle`]: handle::SessionHandle

pub mod catalogue;
pub mod config;
pub mod conspiracy;
pub mod evaluation;
pub mod handle;
pub mod presentation;
pub mod runner;
pub mod scheduler;
pub mod session;
pub mod session_log;

pub use evaluation::{Evaluator, ScriptedEvaluator};
pub use handle::{SessionHandle, SubmitOutcome};
pub use session::{GameSession, SubmitRejection};
