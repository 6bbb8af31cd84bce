//! Enumeration types for the Debunk game.
//!
//! The session phase plus the discrete presentation bands the renderer
//! switches on (music tier, danger rings, sphere colour and glow) and the
//! lifecycle stage of an on-screen post.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Session phase
// ---------------------------------------------------------------------------

/// Coarse state of a play session.
///
/// `Start` precedes any level change. Once `Playing` has been entered the
/// phase is derived from the conspiracy level alone; `Win` and `GameOver`
/// are terminal until the session is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// Title screen; the session has not started yet.
    Start,
    /// Gameplay is running.
    Playing,
    /// The conspiracy level reached zero.
    Win,
    /// The conspiracy level reached the maximum.
    GameOver,
}

impl Phase {
    /// Whether the phase ends the session (only a reset leaves it).
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::GameOver)
    }
}

// ---------------------------------------------------------------------------
// Presentation bands
// ---------------------------------------------------------------------------

/// Background music tier. Ordered from calmest to most intense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BgmTier {
    /// Level below 10.
    Calm,
    /// Level 10 to 24.
    Uneasy,
    /// Level 25 to 39.
    Tense,
    /// Level 40 and above.
    Critical,
}

/// Escalating danger cue drawn around the target (warning rings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DangerLevel {
    /// No ring.
    None,
    /// First warning ring (level 40 and above).
    Warning,
    /// Second ring (level 45 and above).
    Critical,
}

/// Colour band of the target sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ColorBand {
    /// Level below 10.
    Blue,
    /// Level 10 to 19.
    Green,
    /// Level 20 to 29.
    Yellow,
    /// Level 30 to 39.
    Orange,
    /// Level 40 and above.
    Red,
}

/// Glow intensity around the target sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GlowLevel {
    /// Level below 15.
    Faint,
    /// Level 15 to 24.
    Soft,
    /// Level 25 to 34.
    Medium,
    /// Level 35 to 44.
    Strong,
    /// Level 45 and above.
    Blazing,
}

// ---------------------------------------------------------------------------
// Post lifecycle
// ---------------------------------------------------------------------------

/// Visible lifecycle stage of an active post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PostStage {
    /// Just spawned; sliding in from off-screen.
    Entering,
    /// On screen and drifting towards the target until absorbed.
    Approaching,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        assert!(!Phase::Start.is_terminal());
        assert!(!Phase::Playing.is_terminal());
        assert!(Phase::Win.is_terminal());
        assert!(Phase::GameOver.is_terminal());
    }

    #[test]
    fn phase_serializes_snake_case() {
        let json = serde_json::to_string(&Phase::GameOver).unwrap_or_default();
        assert_eq!(json, "\"game_over\"");
    }

    #[test]
    fn bands_are_ordered_by_intensity() {
        assert!(BgmTier::Calm < BgmTier::Critical);
        assert!(DangerLevel::None < DangerLevel::Warning);
        assert!(DangerLevel::Warning < DangerLevel::Critical);
        assert!(ColorBand::Blue < ColorBand::Red);
        assert!(GlowLevel::Faint < GlowLevel::Blazing);
    }
}
