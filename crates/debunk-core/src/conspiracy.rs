//! Conspiracy level state machine.
//!
//! The machine owns the numeric conspiracy level and the session phase.
//! It is the only code allowed to move either of them.
//!
//! # Invariants
//!
//! - The level is clamped into `0..=LEVEL_MAX` on every write, so an
//!   out-of-range level cannot be observed.
//! - `Start` leaves only through [`ConspiracyMachine::start`]; level drift
//!   never starts a session.
//! - Once `Playing`, the phase follows the level: 0 is `Win`,
//!   `LEVEL_MAX` is `GameOver`, anything else is `Playing`.
//! - `Win` and `GameOver` are terminal. Further deltas are ignored until
//!   [`ConspiracyMachine::reset`].

use debunk_types::Phase;

/// Level at which the player loses.
pub const LEVEL_MAX: u32 = 50;

/// Level every session starts from.
pub const LEVEL_START: u32 = 20;

/// Outcome of a level mutation that was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    /// Level before the mutation.
    pub previous: u32,
    /// Level after clamping.
    pub current: u32,
    /// Phase before the mutation.
    pub phase_before: Phase,
    /// Phase after re-evaluation.
    pub phase_after: Phase,
}

impl LevelChange {
    /// Whether the level value actually moved.
    pub const fn level_moved(&self) -> bool {
        self.previous != self.current
    }

    /// Whether the mutation flipped the phase.
    pub fn phase_moved(&self) -> bool {
        self.phase_before != self.phase_after
    }
}

/// Owner of the conspiracy level and session phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConspiracyMachine {
    level: u32,
    phase: Phase,
}

impl ConspiracyMachine {
    /// Create a machine at [`LEVEL_START`] in the `Start` phase.
    pub const fn new() -> Self {
        Self {
            level: LEVEL_START,
            phase: Phase::Start,
        }
    }

    /// Current level.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether gameplay input is accepted.
    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Leave `Start` for `Playing`.
    ///
    /// Returns the `(from, to)` transition, or `None` if the machine was not
    /// in `Start`.
    pub fn start(&mut self) -> Option<(Phase, Phase)> {
        if self.phase != Phase::Start {
            return None;
        }
        self.phase = Phase::Playing;
        Some((Phase::Start, Phase::Playing))
    }

    /// Add `delta` to the level, clamp, and re-evaluate the phase.
    ///
    /// Returns `None` (and changes nothing) unless the phase is `Playing`.
    pub fn apply_delta(&mut self, delta: i32) -> Option<LevelChange> {
        if !self.is_playing() {
            return None;
        }
        let target = i64::from(self.level).saturating_add(i64::from(delta));
        Some(self.settle(target))
    }

    /// Set the level outright (clamped) and re-evaluate the phase.
    ///
    /// Same gating as [`apply_delta`](Self::apply_delta).
    pub fn force_level(&mut self, level: u32) -> Option<LevelChange> {
        if !self.is_playing() {
            return None;
        }
        Some(self.settle(i64::from(level)))
    }

    /// Back to [`LEVEL_START`] in the `Start` phase.
    pub const fn reset(&mut self) {
        self.level = LEVEL_START;
        self.phase = Phase::Start;
    }

    fn settle(&mut self, target: i64) -> LevelChange {
        let previous = self.level;
        let phase_before = self.phase;

        let clamped = target.clamp(0, i64::from(LEVEL_MAX));
        self.level = u32::try_from(clamped).unwrap_or(LEVEL_MAX);
        self.phase = phase_for(self.level);

        LevelChange {
            previous,
            current: self.level,
            phase_before,
            phase_after: self.phase,
        }
    }
}

impl Default for ConspiracyMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Phase implied by a level once gameplay has started.
pub const fn phase_for(level: u32) -> Phase {
    if level == 0 {
        Phase::Win
    } else if level >= LEVEL_MAX {
        Phase::GameOver
    } else {
        Phase::Playing
    }
}
