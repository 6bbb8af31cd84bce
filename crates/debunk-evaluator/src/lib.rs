//! HTTP evaluation client for the Debunk game.
//!
//! [`HttpEvaluator`] implements [`debunk_core::Evaluator`] by POSTing
//! `{"theme": ..., "input": ...}` to the scoring service and reading back
//! `{"persuasive": n, "empathy": n}`. Every failure mode collapses to the
//! zero result, so a broken or slow service slows the player down but can
//! never move the level.

pub mod client;
pub mod error;

pub use client::HttpEvaluator;
pub use error::EvaluatorError;
