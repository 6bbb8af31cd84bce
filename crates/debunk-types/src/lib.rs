//! Shared type definitions for the Debunk persuasion game.
//!
//! This crate is the single source of truth for the data exchanged between
//! the simulation core, the observer API, and the browser renderer. Types
//! flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Session and post identifiers
//! - [`enums`] -- Phase, presentation bands, post stage
//! - [`structs`] -- Game state, posts, submissions, scores, snapshots
//! - [`events`] -- Lifecycle events emitted on every mutation

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BgmTier, ColorBand, DangerLevel, GlowLevel, Phase, PostStage};
pub use events::GameEvent;
pub use ids::{PostId, SessionId};
pub use structs::{
    ActivePost, Engagement, EvaluationResult, GameState, MAX_SCORE, PostTemplate, PostView,
    PresentationTier, SessionSnapshot, SubmissionRecord,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::SessionId::export_all();
        let _ = crate::ids::PostId::export_all();

        let _ = crate::enums::Phase::export_all();
        let _ = crate::enums::BgmTier::export_all();
        let _ = crate::enums::DangerLevel::export_all();
        let _ = crate::enums::ColorBand::export_all();
        let _ = crate::enums::GlowLevel::export_all();
        let _ = crate::enums::PostStage::export_all();

        let _ = crate::structs::GameState::export_all();
        let _ = crate::structs::PostTemplate::export_all();
        let _ = crate::structs::Engagement::export_all();
        let _ = crate::structs::ActivePost::export_all();
        let _ = crate::structs::PostView::export_all();
        let _ = crate::structs::EvaluationResult::export_all();
        let _ = crate::structs::SubmissionRecord::export_all();
        let _ = crate::structs::PresentationTier::export_all();
        let _ = crate::structs::SessionSnapshot::export_all();

        let _ = crate::events::GameEvent::export_all();
    }
}
