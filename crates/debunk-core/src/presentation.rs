//! Presentation trigger mapper.
//!
//! Maps a conspiracy level onto the discrete bands the renderer and audio
//! layer switch on. Every band is closed on the upper side (a level equal
//! to a threshold belongs to the higher band) and non-decreasing in the
//! level.

use debunk_types::{BgmTier, ColorBand, DangerLevel, GlowLevel, PresentationTier};

/// Level at which the warning ring appears.
pub const DANGER_WARNING: u32 = 40;

/// Level at which the warning ring turns critical.
pub const DANGER_CRITICAL: u32 = 45;

/// Presentation tier for a level.
pub const fn tier(level: u32) -> PresentationTier {
    PresentationTier {
        bgm: bgm_tier(level),
        danger: danger_level(level),
        color: color_band(level),
        glow: glow_level(level),
    }
}

/// Background music tier.
pub const fn bgm_tier(level: u32) -> BgmTier {
    match level {
        0..10 => BgmTier::Calm,
        10..25 => BgmTier::Uneasy,
        25..DANGER_WARNING => BgmTier::Tense,
        _ => BgmTier::Critical,
    }
}

/// Warning ring state.
pub const fn danger_level(level: u32) -> DangerLevel {
    if level >= DANGER_CRITICAL {
        DangerLevel::Critical
    } else if level >= DANGER_WARNING {
        DangerLevel::Warning
    } else {
        DangerLevel::None
    }
}

/// Sphere colour band.
pub const fn color_band(level: u32) -> ColorBand {
    match level {
        0..10 => ColorBand::Blue,
        10..20 => ColorBand::Green,
        20..30 => ColorBand::Yellow,
        30..40 => ColorBand::Orange,
        _ => ColorBand::Red,
    }
}

/// Sphere glow intensity.
pub const fn glow_level(level: u32) -> GlowLevel {
    match level {
        45.. => GlowLevel::Blazing,
        35.. => GlowLevel::Strong,
        25.. => GlowLevel::Medium,
        15.. => GlowLevel::Soft,
        _ => GlowLevel::Faint,
    }
}

/// Remembers the last tier and reports band crossings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTracker {
    current: PresentationTier,
}

impl TierTracker {
    /// Start tracking from `level`.
    pub const fn new(level: u32) -> Self {
        Self {
            current: tier(level),
        }
    }

    /// Tier last observed.
    pub const fn current(&self) -> PresentationTier {
        self.current
    }

    /// Feed a new level. Returns `(from, to)` only when some band changed.
    pub fn observe(&mut self, level: u32) -> Option<(PresentationTier, PresentationTier)> {
        let next = tier(level);
        if next == self.current {
            return None;
        }
        let previous = std::mem::replace(&mut self.current, next);
        Some((previous, next))
    }

    /// Re-seed without reporting a crossing.
    pub const fn reset(&mut self, level: u32) {
        self.current = tier(level);
    }
}
