//! Lifecycle events emitted by a game session.
//!
//! Every state mutation produces one or more [`GameEvent`] values. The
//! rendering layer subscribes to them (over the observer `WebSocket`) and
//! reacts; it never inspects simulation internals directly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Phase;
use crate::ids::{PostId, SessionId};
use crate::structs::{ActivePost, PresentationTier, SubmissionRecord};

/// A typed session event. Serialized with an internal `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GameEvent {
    /// The player pressed start; gameplay is running.
    Started {
        /// Session that started.
        session_id: SessionId,
        /// Level at start.
        level: u32,
    },
    /// A post was materialized from the catalogue.
    Spawned {
        /// The new post.
        post: ActivePost,
    },
    /// A post reached the target and raised the level.
    Absorbed {
        /// The absorbed post.
        post_id: PostId,
        /// Increase drawn for this absorption.
        increase: u32,
        /// Level after the increase was applied.
        level: u32,
    },
    /// A post was removed before it could be absorbed.
    Dismissed {
        /// The dismissed post.
        post_id: PostId,
    },
    /// A submission came back from evaluation and was recorded.
    Scored {
        /// The recorded submission.
        record: SubmissionRecord,
        /// Level delta requested by the scores (zero or negative).
        delta: i32,
        /// Level after the delta was applied.
        level: u32,
    },
    /// The override phrase was submitted; the level was set outright.
    LevelOverridden {
        /// Level before the override.
        previous: u32,
        /// Level after the override.
        level: u32,
    },
    /// The conspiracy level changed.
    LevelChanged {
        /// Level before the mutation.
        previous: u32,
        /// Level after the mutation.
        current: u32,
    },
    /// The phase changed.
    PhaseChanged {
        /// Phase before the transition.
        from: Phase,
        /// Phase after the transition.
        to: Phase,
    },
    /// The level crossed a presentation band boundary.
    PresentationChanged {
        /// Tier before the crossing.
        from: PresentationTier,
        /// Tier after the crossing.
        to: PresentationTier,
    },
    /// The session was reset; a new session id is in effect.
    Reset {
        /// The new session id.
        session_id: SessionId,
    },
}

impl GameEvent {
    /// Short name for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Spawned { .. } => "spawned",
            Self::Absorbed { .. } => "absorbed",
            Self::Dismissed { .. } => "dismissed",
            Self::Scored { .. } => "scored",
            Self::LevelOverridden { .. } => "level_overridden",
            Self::LevelChanged { .. } => "level_changed",
            Self::PhaseChanged { .. } => "phase_changed",
            Self::PresentationChanged { .. } => "presentation_changed",
            Self::Reset { .. } => "reset",
        }
    }
}
