//! Core data structs for the Debunk game.
//!
//! Covers the observable game state, post templates and their spawned
//! instances, submission history records, evaluation scores, and the
//! presentation tier consumed by the renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BgmTier, ColorBand, DangerLevel, GlowLevel, Phase, PostStage};
use crate::ids::{PostId, SessionId};

/// Highest score either evaluation axis can take.
pub const MAX_SCORE: u8 = 5;

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// Observable state of a play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// Session (generation) this state belongs to.
    pub session_id: SessionId,
    /// Current conspiracy level, always within `0..=50`.
    pub conspiracy_level: u32,
    /// Sum of every persuasiveness score this session.
    pub total_persuasive: u32,
    /// Sum of every empathy score this session.
    pub total_empathy: u32,
    /// Current phase.
    pub phase: Phase,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// A catalogue entry: the immutable content of a hostile post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PostTemplate {
    /// Display name of the posting account.
    pub account_name: String,
    /// Handle of the posting account (e.g. `@truth_seeker`).
    pub account_id: String,
    /// Body text.
    pub text_content: String,
    /// Hash tags rendered under the body.
    #[serde(default)]
    pub hash_tags: Vec<String>,
}

/// Engagement counters shown on a post. Drawn once at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Engagement {
    /// Like count.
    pub likes: u32,
    /// Repost count.
    pub retweets: u32,
    /// Reply count.
    pub comments: u32,
}

/// A post instance currently travelling towards the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActivePost {
    /// Unique, never reused identifier.
    pub id: PostId,
    /// Catalogue content.
    #[serde(flatten)]
    pub template: PostTemplate,
    /// Display row (cosmetic; several posts may share a row).
    pub vertical_slot: u32,
    /// Engagement counters fixed at spawn.
    pub engagement: Engagement,
    /// Session-clock time of the spawn, in milliseconds.
    pub spawned_at_ms: u64,
    /// Session-clock time at which the post is absorbed, in milliseconds.
    pub absorb_at_ms: u64,
}

/// An active post as served to the renderer, with lifecycle progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PostView {
    /// The post itself.
    #[serde(flatten)]
    pub post: ActivePost,
    /// Current visible stage.
    pub stage: PostStage,
    /// Milliseconds until absorption.
    pub remaining_ms: u64,
}

// ---------------------------------------------------------------------------
// Evaluation and history
// ---------------------------------------------------------------------------

/// Persuasiveness and empathy scores for one submission, each in `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EvaluationResult {
    /// Persuasiveness score.
    pub persuasive: u8,
    /// Empathy score.
    pub empathy: u8,
}

impl EvaluationResult {
    /// The "no effect" result returned when evaluation fails.
    pub const ZERO: Self = Self {
        persuasive: 0,
        empathy: 0,
    };

    /// Build a result from integer scores, clamping each into `0..=5`.
    pub fn new(persuasive: u8, empathy: u8) -> Self {
        Self {
            persuasive: persuasive.min(MAX_SCORE),
            empathy: empathy.min(MAX_SCORE),
        }
    }

    /// Build a result from raw JSON numbers.
    ///
    /// Each value is rounded to the nearest integer and clamped into
    /// `0..=5`. A non-finite value counts as 0.
    pub fn clamped(persuasive: f64, empathy: f64) -> Self {
        Self {
            persuasive: clamp_score(persuasive),
            empathy: clamp_score(empathy),
        }
    }

    /// Combined score (`persuasive + empathy`).
    pub const fn total(self) -> u8 {
        self.persuasive.saturating_add(self.empathy)
    }

    /// Whether this is the zero result.
    pub const fn is_zero(self) -> bool {
        self.persuasive == 0 && self.empathy == 0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    // Clamped into 0.0..=5.0 first, so the cast cannot truncate.
    raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}

/// One player submission and the scores it earned. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubmissionRecord {
    /// The submitted text (trimmed).
    pub text: String,
    /// When the result was recorded.
    pub timestamp: DateTime<Utc>,
    /// Persuasiveness score, `0..=5`.
    pub persuasive: u8,
    /// Empathy score, `0..=5`.
    pub empathy: u8,
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Discrete presentation state derived from the conspiracy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PresentationTier {
    /// Background music tier.
    pub bgm: BgmTier,
    /// Warning ring state.
    pub danger: DangerLevel,
    /// Sphere colour band.
    pub color: ColorBand,
    /// Sphere glow intensity.
    pub glow: GlowLevel,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything the rendering layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionSnapshot {
    /// Level, totals, and phase.
    pub state: GameState,
    /// Theme in play.
    pub theme: String,
    /// Submission history, oldest first.
    pub history: Vec<SubmissionRecord>,
    /// Active posts with remaining lifetime.
    pub posts: Vec<PostView>,
    /// Current presentation tier.
    pub presentation: PresentationTier,
    /// Whether a submission is awaiting its evaluation.
    pub submission_in_flight: bool,
}
